/// 叠加层注入元素统一携带的标记属性
pub const OVERLAY_MARKER_ATTR: &str = "data-chat-translator";

/// 块级元素：内容非空时追加一个换行
pub const BLOCK_ELEMENTS: &[&str] = &[
    "div",
    "p",
    "pre",
    "blockquote",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
];

/// 不可见元素：不参与文本提取
pub const INVISIBLE_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "meta", "link", "title",
];

/// 代码元素：原样拼接子节点
pub const CODE_ELEMENTS: &[&str] = &["code", "kbd", "samp"];

/// 列表项前缀
pub const BULLET_MARKER: &str = "•";

/// 判断元素是否为叠加层注入的元素
pub fn is_overlay_element(node: &markup5ever_rcdom::Handle) -> bool {
    super::dom::get_node_attr(node, OVERLAY_MARKER_ATTR).is_some()
}
