//! HTML 处理模块
//!
//! - `dom`: 基础 DOM 操作（查询、插入、移除、节点身份）
//! - `text`: 保留格式的消息文本提取
//! - `serializer`: 序列化功能
//! - `utils`: 元素分类常量

pub mod dom;
pub mod serializer;
pub mod text;
pub mod utils;

pub use dom::{
    append_child, append_text, class_contains, detach_node, find_descendants,
    find_first_descendant, get_next_sibling, get_node_attr, get_node_name, get_parent_node,
    has_class, html_to_dom, insert_after, is_inclusive_descendant, new_element, set_node_attr,
    text_content, NodeId,
};
pub use serializer::serialize_node;
pub use text::{extract_text, normalize_whitespace, ExtractedText, TextExtractor};
pub use utils::{is_overlay_element, OVERLAY_MARKER_ATTR};
