//! 叠加层元素的构建与查询
//!
//! 注入的元素都带有 `data-chat-translator` 标记属性，值为元素角色。

use markup5ever_rcdom::Handle;

use super::state::OverlayState;
use crate::host::LiveDocument;
use crate::parsers::html::dom::{find_descendants, get_node_attr, set_node_attr};
use crate::parsers::html::utils::OVERLAY_MARKER_ATTR;
use crate::translation::TranslationError;

pub const AFFORDANCE_CLASS: &str = "chat-translate-btn";
pub const PANEL_CLASS: &str = "chat-translation";
pub const ERROR_PANEL_CLASS: &str = "chat-translation chat-translation-error";
pub const RETRY_CLASS: &str = "chat-translation-retry";

const RESULT_HEADER: &str = "翻译：";
const RETRY_RESULT_HEADER: &str = "翻译 (重试)：";
const ERROR_HEADER: &str = "翻译失败：";
const ERROR_HINT: &str = "点击\"重试\"按钮重新翻译";
const RETRY_LABEL: &str = "🔄";
const RETRY_TITLE: &str = "重新翻译";

/// 注入元素的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayRole {
    Affordance,
    Panel,
    Retry,
}

impl OverlayRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayRole::Affordance => "affordance",
            OverlayRole::Panel => "panel",
            OverlayRole::Retry => "retry",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "affordance" => Some(OverlayRole::Affordance),
            "panel" => Some(OverlayRole::Panel),
            "retry" => Some(OverlayRole::Retry),
            _ => None,
        }
    }
}

/// 读取元素的叠加层角色
pub fn overlay_role(node: &Handle) -> Option<OverlayRole> {
    get_node_attr(node, OVERLAY_MARKER_ATTR).and_then(|value| OverlayRole::parse(&value))
}

/// 面板及其内部的重试按钮
#[derive(Debug, Clone)]
pub struct RenderedPanel {
    pub panel: Handle,
    pub retry: Handle,
}

/// 创建翻译按钮
pub fn create_affordance(document: &LiveDocument, state: OverlayState) -> Handle {
    let button = document.create_element(
        "button",
        &[
            ("class", AFFORDANCE_CLASS),
            ("type", "button"),
            (OVERLAY_MARKER_ATTR, OverlayRole::Affordance.as_str()),
        ],
    );
    apply_state(document, &button, state);
    button
}

/// 把状态投影到按钮上：文字、`disabled` 与 `data-state`
pub fn apply_state(document: &LiveDocument, affordance: &Handle, state: OverlayState) {
    document.clear_children(affordance);
    document.append_text(affordance, state.label());
    set_node_attr(
        affordance,
        "disabled",
        state.disables_affordance().then_some(""),
    );
    set_node_attr(affordance, "data-state", Some(state.name()));
}

/// 结果面板；译文作为文本节点插入，不会被解析为标记
pub fn create_result_panel(document: &LiveDocument, translated: &str, retry: bool) -> RenderedPanel {
    let header = if retry { RETRY_RESULT_HEADER } else { RESULT_HEADER };
    build_panel(document, PANEL_CLASS, header, &[translated])
}

/// 错误面板
pub fn create_error_panel(document: &LiveDocument, error: &TranslationError) -> RenderedPanel {
    let message = error.to_string();
    build_panel(document, ERROR_PANEL_CLASS, ERROR_HEADER, &[&message, ERROR_HINT])
}

fn build_panel(
    document: &LiveDocument,
    class: &str,
    header_text: &str,
    lines: &[&str],
) -> RenderedPanel {
    let panel = document.create_element(
        "div",
        &[("class", class), (OVERLAY_MARKER_ATTR, OverlayRole::Panel.as_str())],
    );

    let header = document.create_element("div", &[("class", "chat-translation-header")]);
    document.append_text(&header, header_text);
    document.append_child(&panel, &header);

    for line in lines {
        let body = document.create_element("div", &[("class", "chat-translation-body")]);
        document.append_text(&body, line);
        document.append_child(&panel, &body);
    }

    let retry = document.create_element(
        "button",
        &[
            ("class", RETRY_CLASS),
            ("type", "button"),
            ("title", RETRY_TITLE),
            (OVERLAY_MARKER_ATTR, OverlayRole::Retry.as_str()),
        ],
    );
    document.append_text(&retry, RETRY_LABEL);
    document.append_child(&panel, &retry);

    RenderedPanel { panel, retry }
}

/// 消息根节点下所有叠加层面板
pub fn find_panels(message_root: &Handle) -> Vec<Handle> {
    find_descendants(message_root, |n| overlay_role(n) == Some(OverlayRole::Panel))
}

/// 消息根节点下第一个翻译按钮
pub fn find_affordance(message_root: &Handle) -> Option<Handle> {
    find_descendants(message_root, |n| overlay_role(n) == Some(OverlayRole::Affordance))
        .into_iter()
        .next()
}
