use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, NodeData, SerializableHandle};

/// 序列化节点及其子树为 HTML 字符串
///
/// 主要用于日志与测试断言，序列化失败时返回空字符串。文档节点本身
/// 无法序列化，只输出其子节点。
pub fn serialize_node(node: &Handle) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let traversal_scope = match node.data {
        NodeData::Document => TraversalScope::ChildrenOnly(None),
        _ => TraversalScope::IncludeNode,
    };
    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };

    if let Err(e) = serialize(&mut buf, &serializable, opts) {
        tracing::warn!("无法序列化节点: {}", e);
        return String::new();
    }

    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{find_first_descendant, get_node_name, html_to_dom};

    #[test]
    fn serializes_element_with_its_children() {
        let dom = html_to_dom(b"<div class=a><b>hi</b></div>", "utf-8");
        let div = find_first_descendant(&dom.document, |n| get_node_name(n) == Some("div"))
            .expect("div");
        assert_eq!(serialize_node(&div), "<div class=\"a\"><b>hi</b></div>");
    }
}
