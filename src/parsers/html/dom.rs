use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, TendrilSink};
use html5ever::tree_builder::{create_element, NodeOrText, TreeSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// 节点身份标识
///
/// 宿主文档中的节点以 `Rc` 指针身份区分，而不是以内容区分：
/// 两条文本完全相同的消息依然是两个不同的节点。只要持有对应的
/// `Handle`，该标识就保持稳定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn of(node: &Handle) -> Self {
        NodeId(Rc::as_ptr(node) as *const () as usize)
    }
}

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let s: String = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => {
            let (string, _, _) = encoding.decode(data);
            string.into_owned()
        }
        None => String::from_utf8_lossy(data).into_owned(),
    };

    parse_document(RcDom::default(), Default::default()).one(s)
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 设置节点属性，`None` 表示删除该属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<&str>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        let position = attrs.iter().position(|attr| &*attr.name.local == attr_name);

        match (position, attr_value) {
            (Some(i), Some(value)) => {
                attrs[i].value.clear();
                attrs[i].value.push_slice(value);
            }
            (Some(i), None) => {
                attrs.remove(i);
            }
            (None, Some(value)) => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                value: format_tendril!("{}", value),
            }),
            (None, None) => {}
        }
    }
}

/// 判断 class 属性是否包含给定子串（等价于 CSS 的 `[class*="..."]`）
pub fn class_contains(node: &Handle, fragment: &str) -> bool {
    get_node_attr(node, "class")
        .map(|class| class.contains(fragment))
        .unwrap_or(false)
}

/// 判断 class 属性是否含有完整的 class 标记
pub fn has_class(node: &Handle, token: &str) -> bool {
    get_node_attr(node, "class")
        .map(|class| class.split_ascii_whitespace().any(|t| t == token))
        .unwrap_or(false)
}

/// 获取父节点
///
/// rcdom 的父指针存放在 `Cell` 中，读取时需要先取出再放回。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 获取下一个兄弟节点
pub fn get_next_sibling(node: &Handle) -> Option<Handle> {
    let parent = get_parent_node(node)?;
    let children = parent.children.borrow();
    let index = children.iter().position(|child| Rc::ptr_eq(child, node))?;
    children.get(index + 1).cloned()
}

/// 判断 `node` 是否位于 `ancestor` 子树内（包含自身）
pub fn is_inclusive_descendant(node: &Handle, ancestor: &Handle) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if Rc::ptr_eq(&n, ancestor) {
            return true;
        }
        current = get_parent_node(&n);
    }
    false
}

/// 按文档顺序（先序深度优先）收集 `root` 下所有满足条件的元素，不含 `root` 自身
pub fn find_descendants<F>(root: &Handle, predicate: F) -> Vec<Handle>
where
    F: Fn(&Handle) -> bool,
{
    let mut found = Vec::new();
    collect_descendants(root, &predicate, &mut found);
    found
}

fn collect_descendants<F>(node: &Handle, predicate: &F, found: &mut Vec<Handle>)
where
    F: Fn(&Handle) -> bool,
{
    for child in node.children.borrow().iter() {
        if matches!(child.data, NodeData::Element { .. }) && predicate(child) {
            found.push(child.clone());
        }
        collect_descendants(child, predicate, found);
    }
}

/// 查找 `root` 下第一个满足条件的元素（文档顺序），不含 `root` 自身
pub fn find_first_descendant<F>(root: &Handle, predicate: F) -> Option<Handle>
where
    F: Fn(&Handle) -> bool,
{
    fn visit<F: Fn(&Handle) -> bool>(node: &Handle, predicate: &F) -> Option<Handle> {
        for child in node.children.borrow().iter() {
            if matches!(child.data, NodeData::Element { .. }) && predicate(child) {
                return Some(child.clone());
            }
            if let Some(found) = visit(child, predicate) {
                return Some(found);
            }
        }
        None
    }

    visit(root, &predicate)
}

/// 拼接子树内所有文本节点的原始内容（等价于 DOM 的 `textContent`）
pub fn text_content(node: &Handle) -> String {
    let mut buf = String::new();
    push_text_content(node, &mut buf);
    buf
}

fn push_text_content(node: &Handle, buf: &mut String) {
    match &node.data {
        NodeData::Text { contents } => buf.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                push_text_content(child, buf);
            }
        }
    }
}

/// 创建一个游离的元素节点
pub fn new_element(dom: &RcDom, tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: format_tendril!("{}", value),
        })
        .collect();

    create_element(dom, QualName::new(None, ns!(html), LocalName::from(tag)), attrs)
}

/// 在 `parent` 末尾追加子节点
pub fn append_child(dom: &RcDom, parent: &Handle, child: &Handle) {
    dom.append(parent, NodeOrText::AppendNode(child.clone()));
}

/// 在 `parent` 末尾追加文本
pub fn append_text(dom: &RcDom, parent: &Handle, text: &str) {
    dom.append(parent, NodeOrText::AppendText(format_tendril!("{}", text)));
}

/// 将 `new_node` 插入到 `reference` 之后；`reference` 没有父节点时不做任何事
pub fn insert_after(dom: &RcDom, reference: &Handle, new_node: &Handle) -> bool {
    match get_next_sibling(reference) {
        Some(next) => {
            dom.append_before_sibling(&next, NodeOrText::AppendNode(new_node.clone()));
            true
        }
        None => match get_parent_node(reference) {
            Some(parent) => {
                append_child(dom, &parent, new_node);
                true
            }
            None => false,
        },
    }
}

/// 将节点从其父节点中移除
pub fn detach_node(dom: &RcDom, node: &Handle) {
    if get_parent_node(node).is_some() {
        dom.remove_from_parent(node);
    }
}
