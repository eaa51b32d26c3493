//! 单条消息的叠加层状态

use std::fmt;

/// 叠加层状态
///
/// 按钮上的文字只是状态的投影，永远不反过来作为状态来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverlayState {
    /// 尚未操作
    #[default]
    Idle,
    /// 请求进行中；`retry` 表示本次请求由重试触发
    Pending { retry: bool },
    /// 成功，结果面板可见
    Shown,
    /// 失败，错误面板可见
    Errored,
    /// 成功后的冷却窗口
    CoolDown,
    /// 冷却结束，可以再次翻译
    RetryArmed,
}

impl OverlayState {
    /// 按钮文字
    pub fn label(&self) -> &'static str {
        match self {
            OverlayState::Idle => "翻译",
            OverlayState::Pending { .. } => "翻译中...",
            OverlayState::Shown | OverlayState::CoolDown => "已翻译",
            OverlayState::RetryArmed | OverlayState::Errored => "重试",
        }
    }

    /// 该状态下按钮是否禁用
    pub fn disables_affordance(&self) -> bool {
        matches!(
            self,
            OverlayState::Pending { .. } | OverlayState::Shown | OverlayState::CoolDown
        )
    }

    /// 该状态下是否接受点击
    pub fn accepts_activation(&self) -> bool {
        matches!(
            self,
            OverlayState::Idle | OverlayState::RetryArmed | OverlayState::Errored
        )
    }

    /// 从该状态发起的请求是否算作重试
    pub fn is_retry_origin(&self) -> bool {
        matches!(self, OverlayState::RetryArmed | OverlayState::Errored)
    }

    /// 用于 `data-state` 属性与日志的名称
    pub fn name(&self) -> &'static str {
        match self {
            OverlayState::Idle => "idle",
            OverlayState::Pending { .. } => "pending",
            OverlayState::Shown => "shown",
            OverlayState::Errored => "errored",
            OverlayState::CoolDown => "cool-down",
            OverlayState::RetryArmed => "retry-armed",
        }
    }
}

impl fmt::Display for OverlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
