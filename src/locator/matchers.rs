//! 结构匹配器
//!
//! 宿主文档的标记结构不受控制，且至少存在两代结构及若干临时变体。
//! 这里把每种已知结构描述为一个带名称的选择器，按可靠程度排列成有序
//! 列表，由 [`MessageLocator`](super::MessageLocator) 依序使用。

use markup5ever_rcdom::Handle;

use crate::parsers::html::dom::{class_contains, get_node_attr, get_node_name};

/// 简化的 CSS 选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `[class*="..."]`
    ClassContains(&'static str),
    /// `[id^="..."]`
    IdPrefix(&'static str),
    /// `[name="value"]`
    AttrEquals(&'static str, &'static str),
    /// 标签名
    Tag(&'static str),
    /// `tag[class*="..."]`
    TagWithClass(&'static str, &'static str),
}

impl Selector {
    pub fn matches(&self, node: &Handle) -> bool {
        match *self {
            Selector::ClassContains(fragment) => class_contains(node, fragment),
            Selector::IdPrefix(prefix) => get_node_attr(node, "id")
                .map(|id| id.starts_with(prefix))
                .unwrap_or(false),
            Selector::AttrEquals(name, value) => {
                get_node_attr(node, name).as_deref() == Some(value)
            }
            Selector::Tag(tag) => get_node_name(node) == Some(tag),
            Selector::TagWithClass(tag, fragment) => {
                get_node_name(node) == Some(tag) && class_contains(node, fragment)
            }
        }
    }
}

/// 带名称的结构匹配器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralMatcher {
    pub name: &'static str,
    pub selector: Selector,
}

impl StructuralMatcher {
    pub const fn new(name: &'static str, selector: Selector) -> Self {
        Self { name, selector }
    }

    pub fn matches(&self, node: &Handle) -> bool {
        self.selector.matches(node)
    }
}

/// 锚点候选：按钮插入到匹配元素本身，或其父元素中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorTarget {
    Element,
    Parent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatcher {
    pub matcher: StructuralMatcher,
    pub target: AnchorTarget,
}

/// 消息根节点匹配器
pub const MESSAGE_ROOT_MATCHERS: &[StructuralMatcher] = &[
    StructuralMatcher::new("list-item-id", Selector::IdPrefix("chat-messages-")),
    StructuralMatcher::new("message-list-item", Selector::ClassContains("messageListItem")),
    StructuralMatcher::new("message-class", Selector::ClassContains("message-")),
];

/// 消息内容节点匹配器
pub const CONTENT_MATCHERS: &[StructuralMatcher] = &[
    StructuralMatcher::new("message-content", Selector::ClassContains("messageContent")),
    StructuralMatcher::new("markup", Selector::ClassContains("markup")),
    StructuralMatcher::new("slate-editor", Selector::AttrEquals("data-slate-editor", "true")),
];

/// 按钮锚点匹配器
pub const ANCHOR_MATCHERS: &[AnchorMatcher] = &[
    AnchorMatcher {
        matcher: StructuralMatcher::new("message-header", Selector::ClassContains("messageHeader")),
        target: AnchorTarget::Element,
    },
    AnchorMatcher {
        matcher: StructuralMatcher::new("h3-header", Selector::TagWithClass("h3", "header")),
        target: AnchorTarget::Element,
    },
    AnchorMatcher {
        matcher: StructuralMatcher::new("username", Selector::ClassContains("username")),
        target: AnchorTarget::Parent,
    },
    AnchorMatcher {
        matcher: StructuralMatcher::new("timestamp-class", Selector::ClassContains("timestamp")),
        target: AnchorTarget::Parent,
    },
    AnchorMatcher {
        matcher: StructuralMatcher::new("time", Selector::Tag("time")),
        target: AnchorTarget::Parent,
    },
];

/// 应用外壳标记，出现即视为宿主已就绪
pub const APP_READY_MATCHER: StructuralMatcher =
    StructuralMatcher::new("app-shell", Selector::ClassContains("app-"));

/// 通用回退扫描时需要排除的角色标记（匹配 class 与 aria-label）
pub const EXCLUDED_ROLE_MARKERS: &[&str] = &["timestamp", "username", "avatar", "header", "button"];

/// 通用回退扫描时需要排除的标签
pub const EXCLUDED_TAGS: &[&str] = &["button", "time", "img", "svg", "script", "style"];

/// 判断元素是否带有被排除的角色标记
pub fn has_excluded_role(node: &Handle) -> bool {
    if let Some(tag) = get_node_name(node) {
        if EXCLUDED_TAGS.contains(&tag) {
            return true;
        }
    }

    if get_node_attr(node, "role").as_deref() == Some("button") {
        return true;
    }

    let markers = [get_node_attr(node, "class"), get_node_attr(node, "aria-label")];
    markers.iter().flatten().any(|value| {
        let value = value.to_ascii_lowercase();
        EXCLUDED_ROLE_MARKERS.iter().any(|marker| value.contains(marker))
    })
}
