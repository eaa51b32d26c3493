//! 消息文本提取
//!
//! 将一条消息的内容子树转换为保留格式的纯文本：
//!
//! - 换行标签 `<br>` 输出单个换行
//! - 块级元素内容非空时追加一个换行，避免空容器产生多余空行
//! - 列表项以 `• ` 开头并以换行结尾
//! - 代码与其他行内元素（强调、链接、提及、表情）只拼接子节点
//! - 脚本、样式等不可见元素以及叠加层注入的元素不产生任何输出
//!
//! 提取结果最后统一规整：三个及以上连续换行压缩为两个，水平空白压缩为
//! 单个空格，去除首尾空白。同一棵未变化的子树总是得到同一个字符串。

use std::fmt;
use std::sync::OnceLock;

use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use super::dom::get_node_name;
use super::utils::{
    is_overlay_element, BLOCK_ELEMENTS, BULLET_MARKER, CODE_ELEMENTS, INVISIBLE_ELEMENTS,
};

/// 规整后的提取文本
///
/// 不可变值；空字符串表示“没有内容”。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// 对原始文本做规整并包装
    pub fn normalize(raw: &str) -> Self {
        ExtractedText(normalize_whitespace(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 字符数（而非字节数）
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 节点在提取时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    LineBreak,
    Block,
    ListItem,
    Code,
    Invisible,
    Inline,
}

fn classify(node: &Handle, tag: &str) -> NodeKind {
    if is_overlay_element(node) || INVISIBLE_ELEMENTS.contains(&tag) {
        NodeKind::Invisible
    } else if tag == "br" {
        NodeKind::LineBreak
    } else if tag == "li" {
        NodeKind::ListItem
    } else if BLOCK_ELEMENTS.contains(&tag) {
        NodeKind::Block
    } else if CODE_ELEMENTS.contains(&tag) {
        NodeKind::Code
    } else {
        NodeKind::Inline
    }
}

/// 文本提取器
///
/// 无状态；既用于发现阶段过滤空消息，也用于点击翻译时重新获取
/// （可能已被编辑的）消息内容。
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        TextExtractor
    }

    /// 提取 `content_root` 子树的规整文本
    pub fn extract(&self, content_root: &Handle) -> ExtractedText {
        ExtractedText::normalize(&self.extract_raw(content_root))
    }

    /// 提取未经规整的文本
    pub fn extract_raw(&self, node: &Handle) -> String {
        let mut buf = String::new();
        self.visit(node, &mut buf);
        buf
    }

    fn visit(&self, node: &Handle, buf: &mut String) {
        match &node.data {
            NodeData::Text { contents } => buf.push_str(&contents.borrow()),
            NodeData::Document => self.visit_children(node, buf),
            NodeData::Element { .. } => {
                let tag = get_node_name(node).unwrap_or_default();
                match classify(node, tag) {
                    NodeKind::Invisible => {}
                    NodeKind::LineBreak => buf.push('\n'),
                    NodeKind::Block => {
                        let mut content = String::new();
                        self.visit_children(node, &mut content);
                        let non_empty = !content.trim().is_empty();
                        buf.push_str(&content);
                        if non_empty {
                            buf.push('\n');
                        }
                    }
                    NodeKind::ListItem => {
                        let mut content = String::new();
                        self.visit_children(node, &mut content);
                        let item = content.trim();
                        if !item.is_empty() {
                            buf.push_str(BULLET_MARKER);
                            buf.push(' ');
                            buf.push_str(item);
                            buf.push('\n');
                        }
                    }
                    NodeKind::Code | NodeKind::Inline => self.visit_children(node, buf),
                }
            }
            // 注释、文档类型声明、处理指令
            _ => {}
        }
    }

    fn visit_children(&self, node: &Handle, buf: &mut String) {
        for child in node.children.borrow().iter() {
            self.visit(child, buf);
        }
    }
}

/// 便捷函数：使用默认提取器提取文本
pub fn extract_text(content_root: &Handle) -> ExtractedText {
    TextExtractor.extract(content_root)
}

fn excess_newlines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n(?:[^\S\n]*\n){2,}").expect("valid newline pattern"))
}

fn horizontal_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\S\n]+").expect("valid whitespace pattern"))
}

/// 压缩多余换行与水平空白并去除首尾空白
pub fn normalize_whitespace(raw: &str) -> String {
    let text = excess_newlines().replace_all(raw, "\n\n");
    let text = horizontal_whitespace().replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_newline_runs_to_one_blank_line() {
        assert_eq!(normalize_whitespace("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_whitespace("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn blank_lines_holding_spaces_count_as_newline_runs() {
        assert_eq!(normalize_whitespace("a\n\n   \n   b"), "a\n\n b");
        assert_eq!(normalize_whitespace("a\n \t\n\u{a0}\n\nb"), "a\n\nb");
    }

    #[test]
    fn collapses_horizontal_whitespace_but_keeps_newlines() {
        assert_eq!(normalize_whitespace("  a \t\u{a0} b\nc  "), "a b\nc");
    }

    #[test]
    fn whitespace_only_input_becomes_empty() {
        assert!(ExtractedText::normalize(" \n\t \n\n\n ").is_empty());
    }

    #[test]
    fn char_count_counts_scalar_values() {
        assert_eq!(ExtractedText::normalize("你好").char_count(), 2);
    }
}
