//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 安装 fmt 订阅器
///
/// `RUST_LOG` 优先于传入的级别；重复调用不会报错，已安装的订阅器保持不变。
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chat_overlay={}", level)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level, "日志系统已初始化");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init("debug");
        init("info");
    }
}
