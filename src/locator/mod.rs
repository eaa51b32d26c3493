//! # 消息定位模块
//!
//! 在整个文档树中枚举消息根节点，并在每个根节点内找到唯一的内容节点。
//!
//! 定位依赖有序的结构匹配器列表（见 [`matchers`]）：
//!
//! - 查找根节点时取所有匹配器命中的并集，按节点身份去重，保持文档顺序
//! - 查找内容节点时按优先级依次尝试，返回第一个命中
//! - 全部未命中时退回到通用扫描：选择第一个含有非空白文本、
//!   且子树内不含时间戳/用户名/头像/标题/按钮等角色标记的后代元素
//!
//! 通用扫描是对未知结构变体的尽力近似，偶尔可能选错内容节点。
//! 定位失败不是错误，只表示“这里没有需要处理的东西”。

pub mod matchers;

use std::collections::HashSet;

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::dom::{
    find_first_descendant, get_parent_node, is_inclusive_descendant, text_content, NodeId,
};
use crate::parsers::html::utils::is_overlay_element;

pub use matchers::{
    has_excluded_role, AnchorMatcher, AnchorTarget, Selector, StructuralMatcher,
    ANCHOR_MATCHERS, APP_READY_MATCHER, CONTENT_MATCHERS, MESSAGE_ROOT_MATCHERS,
};

/// 定位到的消息根节点
#[derive(Debug, Clone)]
pub struct LocatedRoot {
    pub node: Handle,
    /// 首个命中的匹配器名称
    pub matcher: &'static str,
}

/// 翻译按钮的插入位置
#[derive(Debug, Clone)]
pub enum Anchor {
    /// 追加为该元素的最后一个子节点
    AppendTo(Handle),
    /// 紧跟在内容节点之后插入
    AfterContent(Handle),
}

/// 消息定位器
#[derive(Debug, Clone)]
pub struct MessageLocator {
    root_matchers: Vec<StructuralMatcher>,
    content_matchers: Vec<StructuralMatcher>,
    anchor_matchers: Vec<AnchorMatcher>,
    ready_matcher: StructuralMatcher,
}

impl Default for MessageLocator {
    fn default() -> Self {
        Self {
            root_matchers: MESSAGE_ROOT_MATCHERS.to_vec(),
            content_matchers: CONTENT_MATCHERS.to_vec(),
            anchor_matchers: ANCHOR_MATCHERS.to_vec(),
            ready_matcher: APP_READY_MATCHER,
        }
    }
}

impl MessageLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用自定义匹配器列表创建定位器，列表顺序即优先级
    pub fn with_matchers(
        root_matchers: Vec<StructuralMatcher>,
        content_matchers: Vec<StructuralMatcher>,
        anchor_matchers: Vec<AnchorMatcher>,
    ) -> Self {
        Self {
            root_matchers,
            content_matchers,
            anchor_matchers,
            ready_matcher: APP_READY_MATCHER,
        }
    }

    /// 枚举文档中的消息根节点
    pub fn find_message_roots(&self, document_root: &Handle) -> Vec<Handle> {
        self.locate_roots(document_root)
            .into_iter()
            .map(|located| located.node)
            .collect()
    }

    /// 枚举消息根节点，并记录首个命中的匹配器
    ///
    /// 同一节点无论被多少个匹配器命中只出现一次；叠加层注入的元素及其
    /// 子树永远不会成为根节点。
    pub fn locate_roots(&self, document_root: &Handle) -> Vec<LocatedRoot> {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut found = Vec::new();
        self.visit_roots(document_root, &mut seen, &mut found);
        found
    }

    fn visit_roots(
        &self,
        node: &Handle,
        seen: &mut HashSet<NodeId>,
        found: &mut Vec<LocatedRoot>,
    ) {
        for child in node.children.borrow().iter() {
            if !matches!(child.data, NodeData::Element { .. }) || is_overlay_element(child) {
                continue;
            }

            if let Some(matcher) = self.root_matchers.iter().find(|m| m.matches(child)) {
                if seen.insert(NodeId::of(child)) {
                    found.push(LocatedRoot {
                        node: child.clone(),
                        matcher: matcher.name,
                    });
                }
            }

            self.visit_roots(child, seen, found);
        }
    }

    /// 在消息根节点内查找内容节点
    pub fn find_content_node(&self, message_root: &Handle) -> Option<Handle> {
        self.content_matchers
            .iter()
            .find_map(|matcher| find_outside_overlay(message_root, |n| matcher.matches(n)))
            .or_else(|| self.fallback_content_node(message_root))
    }

    /// 通用回退：第一个含文本且子树“干净”的后代元素
    ///
    /// 被排除的角色元素连同其子树一起跳过。
    fn fallback_content_node(&self, message_root: &Handle) -> Option<Handle> {
        fn visit(node: &Handle) -> Option<Handle> {
            for child in node.children.borrow().iter() {
                if !matches!(child.data, NodeData::Element { .. })
                    || is_overlay_element(child)
                    || has_excluded_role(child)
                {
                    continue;
                }

                let is_clean = find_first_descendant(child, |d| {
                    has_excluded_role(d) || is_overlay_element(d)
                })
                .is_none();
                if is_clean && !text_content(child).trim().is_empty() {
                    return Some(child.clone());
                }

                if let Some(found) = visit(child) {
                    return Some(found);
                }
            }
            None
        }

        let candidate = visit(message_root)?;
        tracing::debug!("内容节点由通用扫描定位");
        Some(candidate)
    }

    /// 为翻译按钮选择插入位置
    ///
    /// 依次尝试锚点候选（消息头、用户名的父元素、时间戳的父元素），
    /// 都不存在时退回到内容节点之后；连内容节点也找不到时返回 `None`。
    pub fn find_anchor(&self, message_root: &Handle) -> Option<Anchor> {
        for anchor in &self.anchor_matchers {
            let Some(hit) = find_outside_overlay(message_root, |n| anchor.matcher.matches(n))
            else {
                continue;
            };

            let target = match anchor.target {
                AnchorTarget::Element => Some(hit),
                AnchorTarget::Parent => get_parent_node(&hit)
                    .filter(|parent| is_inclusive_descendant(parent, message_root)),
            };

            if let Some(target) = target {
                return Some(Anchor::AppendTo(target));
            }
        }

        self.find_content_node(message_root)
            .map(Anchor::AfterContent)
    }

    /// 宿主应用外壳是否已经渲染
    pub fn is_app_ready(&self, document_root: &Handle) -> bool {
        find_first_descendant(document_root, |n| self.ready_matcher.matches(n)).is_some()
    }
}

/// 查找第一个满足条件、且不在叠加层元素内部的后代元素
fn find_outside_overlay<F>(root: &Handle, predicate: F) -> Option<Handle>
where
    F: Fn(&Handle) -> bool,
{
    fn visit<F: Fn(&Handle) -> bool>(node: &Handle, predicate: &F) -> Option<Handle> {
        for child in node.children.borrow().iter() {
            if !matches!(child.data, NodeData::Element { .. }) || is_overlay_element(child) {
                continue;
            }
            if predicate(child) {
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
