//! # 消息叠加层
//!
//! 每条被发现的消息对应一个 [`MessageOverlayController`]，它拥有注入的
//! 翻译按钮与结果面板，并按如下顺序推进：
//!
//! ```text
//! Idle ─点击→ Pending ─成功→ Shown → CoolDown ─延时→ RetryArmed ─点击→ Pending
//!                     └失败→ Errored ─点击→ Pending
//! ```
//!
//! 请求进行中与冷却期间按钮被禁用，因此同一条消息最多只有一个请求在途。

pub mod controller;
pub mod render;
pub mod state;

use std::rc::Rc;
use std::time::Duration;

use crate::host::{LiveDocument, Notifier};
use crate::locator::MessageLocator;
use crate::parsers::html::text::TextExtractor;
use crate::settings::SettingsHandle;

pub use controller::{Activation, MessageOverlayController};
pub use render::{overlay_role, OverlayRole};
pub use state::OverlayState;

/// 所有控制器共享的协作者
pub struct OverlayContext<T> {
    pub document: Rc<LiveDocument>,
    pub locator: MessageLocator,
    pub extractor: TextExtractor,
    pub translator: T,
    pub settings: SettingsHandle,
    pub notifier: Rc<dyn Notifier>,
    pub cool_down: Duration,
}

impl<T> OverlayContext<T> {
    pub fn new(
        document: Rc<LiveDocument>,
        translator: T,
        settings: SettingsHandle,
        notifier: Rc<dyn Notifier>,
        cool_down: Duration,
    ) -> Self {
        Self {
            document,
            locator: MessageLocator::new(),
            extractor: TextExtractor::new(),
            translator,
            settings,
            notifier,
            cool_down,
        }
    }

    /// 替换消息定位器
    pub fn with_locator(mut self, locator: MessageLocator) -> Self {
        self.locator = locator;
        self
    }
}
