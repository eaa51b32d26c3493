//! # 消息发现循环
//!
//! 三种触发源共用同一个幂等的 [`DiscoveryLoop::scan`]：
//!
//! 1. 宿主就绪并等待一段稳定时间后的首次扫描
//! 2. 收到子树插入通知后的延迟扫描，持续的通知不会推迟它
//! 3. 固定周期的兜底扫描，防止漏掉通知
//!
//! 已处理的消息以节点身份登记，同一根节点无论被扫描多少次都只对应
//! 一个控制器；文本相同的两条消息依然是两个实例。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use markup5ever_rcdom::Handle;
use tokio::time::{interval_at, sleep, sleep_until, Instant, MissedTickBehavior};

use crate::core::OverlayConfig;
use crate::host::{LiveDocument, MutationReceiver, Notifier};
use crate::locator::LocatedRoot;
use crate::overlay::render::find_affordance;
use crate::overlay::{overlay_role, Activation, MessageOverlayController, OverlayContext, OverlayRole};
use crate::parsers::html::dom::get_parent_node;
use crate::parsers::html::NodeId;
use crate::settings::SettingsHandle;
use crate::translation::Translator;

/// 单次扫描的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// 定位到的候选根节点数
    pub candidates: usize,
    /// 本次新建的控制器数
    pub instrumented: usize,
    /// 已登记过的根节点数
    pub already_known: usize,
    /// 嵌套在已登记根节点内、或已带有翻译按钮的根节点数
    pub nested: usize,
    /// 内容为空或过短的根节点数
    pub no_content: usize,
    /// 因根节点脱离文档而移除的控制器数
    pub pruned: usize,
}

/// 消息发现循环
pub struct DiscoveryLoop<T: Translator + 'static> {
    context: Rc<OverlayContext<T>>,
    config: OverlayConfig,
    registry: RefCell<HashMap<NodeId, MessageOverlayController<T>>>,
}

impl<T: Translator + 'static> DiscoveryLoop<T> {
    pub fn new(
        document: Rc<LiveDocument>,
        translator: T,
        settings: SettingsHandle,
        notifier: Rc<dyn Notifier>,
        config: OverlayConfig,
    ) -> Self {
        let context = OverlayContext::new(document, translator, settings, notifier, config.cool_down);
        Self::with_context(Rc::new(context), config)
    }

    pub fn with_context(context: Rc<OverlayContext<T>>, config: OverlayConfig) -> Self {
        Self {
            context,
            config,
            registry: RefCell::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &Rc<OverlayContext<T>> {
        &self.context
    }

    /// 已登记的控制器数
    pub fn instrumented_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// 根节点对应的控制器
    pub fn controller_for(&self, root: &Handle) -> Option<MessageOverlayController<T>> {
        self.registry.borrow().get(&NodeId::of(root)).cloned()
    }

    /// 全部控制器
    pub fn controllers(&self) -> Vec<MessageOverlayController<T>> {
        self.registry.borrow().values().cloned().collect()
    }

    /// 扫描一次文档，为新出现的消息创建控制器
    pub fn scan(&self) -> ScanReport {
        let mut report = ScanReport {
            pruned: self.prune(),
            ..Default::default()
        };

        let document = self.context.document.document();
        let located = self.context.locator.locate_roots(&document);
        report.candidates = located.len();

        for LocatedRoot { node, matcher } in located {
            let id = NodeId::of(&node);
            if self.registry.borrow().contains_key(&id) {
                report.already_known += 1;
                continue;
            }

            if self.is_nested_in_instrumented(&node) || find_affordance(&node).is_some() {
                report.nested += 1;
                continue;
            }

            let qualifies = self
                .context
                .locator
                .find_content_node(&node)
                .map(|content| self.context.extractor.extract(&content))
                .is_some_and(|text| text.char_count() >= self.config.min_content_chars);
            let anchor = if qualifies {
                self.context.locator.find_anchor(&node)
            } else {
                None
            };
            let Some(anchor) = anchor else {
                report.no_content += 1;
                continue;
            };

            tracing::trace!(matcher, "发现新消息");
            let controller = MessageOverlayController::attach(Rc::clone(&self.context), node, &anchor);
            self.registry.borrow_mut().insert(id, controller);
            report.instrumented += 1;
        }

        if report.instrumented > 0 || report.pruned > 0 {
            tracing::debug!(
                candidates = report.candidates,
                instrumented = report.instrumented,
                pruned = report.pruned,
                total = self.instrumented_count(),
                "扫描完成"
            );
        }

        report
    }

    /// 移除根节点已脱离文档的控制器
    fn prune(&self) -> usize {
        let document = &self.context.document;
        let mut registry = self.registry.borrow_mut();
        let before = registry.len();
        registry.retain(|_, controller| document.is_connected(&controller.root()));
        before - registry.len()
    }

    fn is_nested_in_instrumented(&self, node: &Handle) -> bool {
        let registry = self.registry.borrow();
        let mut current = get_parent_node(node);
        while let Some(ancestor) = current {
            if registry.contains_key(&NodeId::of(&ancestor)) {
                return true;
            }
            current = get_parent_node(&ancestor);
        }
        false
    }

    /// 把一次点击分发给所属的控制器
    ///
    /// 点击会冒泡到最近的按钮或重试按钮；不属于任何控制器时返回 `None`。
    pub fn dispatch_activation(&self, target: &Handle) -> Option<Activation> {
        let mut current = Some(target.clone());
        let control = loop {
            let node = current?;
            if matches!(
                overlay_role(&node),
                Some(OverlayRole::Affordance) | Some(OverlayRole::Retry)
            ) {
                break node;
            }
            current = get_parent_node(&node);
        };

        let controller = {
            let registry = self.registry.borrow();
            let mut ancestor = get_parent_node(&control);
            loop {
                let node = ancestor?;
                if let Some(controller) = registry.get(&NodeId::of(&node)) {
                    break controller.clone();
                }
                ancestor = get_parent_node(&node);
            }
        };

        if !controller.is_control(&control) {
            tracing::debug!("忽略点击：控件已过期");
            return None;
        }

        Some(match overlay_role(&control) {
            Some(OverlayRole::Retry) => controller.retry(),
            _ => controller.activate(),
        })
    }

    /// 等待宿主应用外壳渲染完成
    async fn wait_until_ready(&self) {
        let document = self.context.document.document();
        while !self.context.locator.is_app_ready(&document) {
            sleep(self.config.ready_poll_interval).await;
        }
        tracing::debug!("宿主应用已就绪");
    }

    /// 运行发现循环，直到变更通知通道关闭
    pub async fn run(self: Rc<Self>, mut mutations: MutationReceiver) {
        if self.config.wait_for_ready {
            self.wait_until_ready().await;
        }
        sleep(self.config.settle_delay).await;

        let report = self.scan();
        tracing::info!(instrumented = report.instrumented, "首次扫描完成");

        let period = self.config.fallback_period;
        let mut fallback = interval_at(Instant::now() + period, period);
        fallback.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // 一轮变更的扫描时间点：从该轮第一批通知起算，后续批次不顺延
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                batch = mutations.recv() => {
                    let Some(record) = batch else {
                        if deadline.is_some() {
                            self.scan();
                        }
                        break;
                    };
                    if !record.is_empty() && deadline.is_none() {
                        deadline = Some(Instant::now() + self.config.debounce);
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    self.scan();
                }
                _ = fallback.tick() => {
                    self.scan();
                }
            }
        }

        tracing::info!("变更通知通道已关闭，发现循环退出");
    }
}
