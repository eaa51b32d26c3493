//! # 解析器模块
//!
//! 这个模块包含对宿主文档树的解析与处理：
//!
//! - HTML解析和DOM操作
//! - 消息文本提取
//!
//! # 模块组织
//!
//! - `html` - HTML文档解析、DOM操作、文本提取、序列化

pub mod html;

// Re-export commonly used items for convenience
pub use html::{extract_text, html_to_dom, serialize_node, ExtractedText, NodeId, TextExtractor};
