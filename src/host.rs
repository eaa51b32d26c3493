//! 宿主环境模型
//!
//! 叠加层运行在一棵由宿主持续修改的文档树上。这里把宿主需要提供的
//! 能力收拢成几个小接口：
//!
//! - [`LiveDocument`]：可查询、可修改的文档树
//! - [`MutationRecord`]：子树插入通知，经无界通道推送给发现循环
//! - [`Notifier`]：全局的一次性用户提示

use markup5ever_rcdom::{Handle, RcDom};
use tokio::sync::mpsc;

use crate::parsers::html::dom::{
    append_child, append_text, detach_node, find_first_descendant, html_to_dom, insert_after,
    is_inclusive_descendant, new_element,
};
use crate::parsers::html::serializer::serialize_node;

/// 宿主的活动文档
///
/// 节点的生命周期完全由文档持有；叠加层只持有 `Handle`，不复制节点。
pub struct LiveDocument {
    dom: RcDom,
}

impl LiveDocument {
    pub fn new(dom: RcDom) -> Self {
        Self { dom }
    }

    /// 从 UTF-8 HTML 构建文档
    pub fn from_html(html: &str) -> Self {
        Self::new(html_to_dom(html.as_bytes(), "utf-8"))
    }

    /// 按给定字符集解码后构建文档
    pub fn from_bytes(data: &[u8], encoding: &str) -> Self {
        Self::new(html_to_dom(data, encoding))
    }

    /// 文档根节点
    pub fn document(&self) -> Handle {
        self.dom.document.clone()
    }

    pub fn dom(&self) -> &RcDom {
        &self.dom
    }

    /// 创建游离元素，`attrs` 中可包含 `class`
    pub fn create_element(&self, tag: &str, attrs: &[(&str, &str)]) -> Handle {
        new_element(&self.dom, tag, attrs)
    }

    pub fn append_child(&self, parent: &Handle, child: &Handle) {
        append_child(&self.dom, parent, child);
    }

    pub fn append_text(&self, parent: &Handle, text: &str) {
        append_text(&self.dom, parent, text);
    }

    /// 插入到 `reference` 之后；`reference` 已游离时返回 `false`
    pub fn insert_after(&self, reference: &Handle, node: &Handle) -> bool {
        insert_after(&self.dom, reference, node)
    }

    pub fn detach(&self, node: &Handle) {
        detach_node(&self.dom, node);
    }

    /// 移除 `parent` 的全部子节点
    pub fn clear_children(&self, parent: &Handle) {
        let children: Vec<Handle> = parent.children.borrow().iter().cloned().collect();
        for child in &children {
            self.detach(child);
        }
    }

    /// 节点是否仍挂在文档上
    pub fn is_connected(&self, node: &Handle) -> bool {
        is_inclusive_descendant(node, &self.dom.document)
    }

    /// 文档顺序中第一个满足条件的元素
    pub fn find_first<F>(&self, predicate: F) -> Option<Handle>
    where
        F: Fn(&Handle) -> bool,
    {
        find_first_descendant(&self.dom.document, predicate)
    }

    /// 序列化整个文档
    pub fn to_html(&self) -> String {
        serialize_node(&self.dom.document)
    }
}

/// 一批子树插入通知
#[derive(Debug, Clone, Default)]
pub struct MutationRecord {
    pub added: Vec<Handle>,
}

impl MutationRecord {
    pub fn added(nodes: Vec<Handle>) -> Self {
        Self { added: nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}

pub type MutationSender = mpsc::UnboundedSender<MutationRecord>;
pub type MutationReceiver = mpsc::UnboundedReceiver<MutationRecord>;

/// 创建变更通知通道；发送端全部丢弃即表示宿主已关闭
pub fn mutation_channel() -> (MutationSender, MutationReceiver) {
    mpsc::unbounded_channel()
}

/// 全局用户提示
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// 把提示写入日志的默认实现
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(notice = message, "用户提示");
    }
}
