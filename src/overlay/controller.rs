//! 单条消息的叠加层控制器

use std::cell::RefCell;
use std::rc::Rc;

use markup5ever_rcdom::Handle;
use tokio::task::JoinHandle;

use super::render::{
    apply_state, create_affordance, create_error_panel, create_result_panel, find_panels,
    RenderedPanel,
};
use super::state::OverlayState;
use super::OverlayContext;
use crate::locator::Anchor;
use crate::parsers::html::text::ExtractedText;
use crate::parsers::html::NodeId;
use crate::translation::error::helpers;
use crate::translation::{TranslationError, TranslationOutcome, Translator};

/// 一次点击的处理结果
#[derive(Debug)]
pub enum Activation {
    /// 当前状态不接受点击（请求进行中或冷却中）
    Busy(OverlayState),
    /// 提取到的文本为空，什么也不做
    NoContent,
    /// 未配置 API Key，已提示用户
    ConfigMissing,
    /// 请求已发出；任务完成时结果已渲染
    Started(JoinHandle<()>),
}

impl Activation {
    pub fn is_started(&self) -> bool {
        matches!(self, Activation::Started(_))
    }

    /// 取出请求任务
    pub fn into_task(self) -> Option<JoinHandle<()>> {
        match self {
            Activation::Started(task) => Some(task),
            _ => None,
        }
    }
}

struct ControllerState {
    root: Handle,
    affordance: Handle,
    panel: Option<RenderedPanel>,
    state: OverlayState,
    last_extracted_text: Option<ExtractedText>,
    requests_issued: usize,
}

/// 与一条消息一一绑定的状态机
///
/// 持有按钮与当前面板。克隆只是增加引用，所有克隆共享同一份状态。
pub struct MessageOverlayController<T: Translator + 'static> {
    context: Rc<OverlayContext<T>>,
    inner: Rc<RefCell<ControllerState>>,
}

impl<T: Translator + 'static> Clone for MessageOverlayController<T> {
    fn clone(&self) -> Self {
        Self {
            context: Rc::clone(&self.context),
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Translator + 'static> MessageOverlayController<T> {
    /// 创建控制器并把按钮插入到锚点
    pub fn attach(context: Rc<OverlayContext<T>>, root: Handle, anchor: &Anchor) -> Self {
        let affordance = create_affordance(&context.document, OverlayState::Idle);

        match anchor {
            Anchor::AppendTo(target) => context.document.append_child(target, &affordance),
            Anchor::AfterContent(content) => {
                if !context.document.insert_after(content, &affordance) {
                    context.document.append_child(&root, &affordance);
                }
            }
        }

        Self {
            context,
            inner: Rc::new(RefCell::new(ControllerState {
                root,
                affordance,
                panel: None,
                state: OverlayState::Idle,
                last_extracted_text: None,
                requests_issued: 0,
            })),
        }
    }

    pub fn root(&self) -> Handle {
        self.inner.borrow().root.clone()
    }

    pub fn root_id(&self) -> NodeId {
        NodeId::of(&self.inner.borrow().root)
    }

    pub fn affordance(&self) -> Handle {
        self.inner.borrow().affordance.clone()
    }

    pub fn state(&self) -> OverlayState {
        self.inner.borrow().state
    }

    /// 当前面板
    pub fn panel(&self) -> Option<Handle> {
        self.inner.borrow().panel.as_ref().map(|p| p.panel.clone())
    }

    /// 当前面板内的重试按钮
    pub fn retry_control(&self) -> Option<Handle> {
        self.inner.borrow().panel.as_ref().map(|p| p.retry.clone())
    }

    pub fn last_extracted_text(&self) -> Option<ExtractedText> {
        self.inner.borrow().last_extracted_text.clone()
    }

    /// 已发出的请求数
    pub fn requests_issued(&self) -> usize {
        self.inner.borrow().requests_issued
    }

    /// `node` 是否为本控制器的按钮或当前重试按钮
    pub fn is_control(&self, node: &Handle) -> bool {
        let inner = self.inner.borrow();
        Rc::ptr_eq(&inner.affordance, node)
            || inner
                .panel
                .as_ref()
                .is_some_and(|p| Rc::ptr_eq(&p.retry, node))
    }

    /// 处理按钮点击
    ///
    /// 每次都重新提取文本，以反映消息被编辑后的内容。
    pub fn activate(&self) -> Activation {
        let state = self.state();
        if !state.accepts_activation() {
            tracing::debug!(%state, "忽略点击：当前状态不接受操作");
            return Activation::Busy(state);
        }

        let root = self.root();
        let text = self
            .context
            .locator
            .find_content_node(&root)
            .map(|content| self.context.extractor.extract(&content))
            .unwrap_or_default();
        if text.is_empty() {
            tracing::debug!("忽略点击：消息内容为空");
            return Activation::NoContent;
        }

        let settings = self.context.settings.snapshot();
        if !settings.has_api_key() {
            self.context
                .notifier
                .notify(&TranslationError::ConfigMissing.to_string());
            return Activation::ConfigMissing;
        }

        let retry = state.is_retry_origin();
        {
            let mut inner = self.inner.borrow_mut();
            inner.last_extracted_text = Some(text.clone());
            inner.requests_issued += 1;
        }
        self.transition(OverlayState::Pending { retry });

        let this = self.clone();
        let task = tokio::task::spawn_local(async move {
            let outcome = this
                .context
                .translator
                .translate(text.as_str(), &settings.target_language, &settings.api_key)
                .await;
            this.complete(outcome, retry);
        });

        Activation::Started(task)
    }

    /// 重试按钮的点击转发给主按钮
    pub fn retry(&self) -> Activation {
        self.activate()
    }

    fn complete(&self, outcome: TranslationOutcome, retry: bool) {
        match outcome {
            Ok(translated) => {
                let rendered = create_result_panel(&self.context.document, &translated, retry);
                self.render(rendered);
                self.transition(OverlayState::Shown);
                self.transition(OverlayState::CoolDown);
                self.schedule_rearm();
            }
            Err(error) => {
                helpers::log_error(&error);
                let rendered = create_error_panel(&self.context.document, &error);
                self.render(rendered);
                self.transition(OverlayState::Errored);
            }
        }
    }

    fn schedule_rearm(&self) {
        let this = self.clone();
        let cool_down = self.context.cool_down;
        tokio::task::spawn_local(async move {
            tokio::time::sleep(cool_down).await;
            if this.state() == OverlayState::CoolDown {
                this.transition(OverlayState::RetryArmed);
            }
        });
    }

    /// 插入新面板，先移除该消息已有的全部面板
    fn render(&self, rendered: RenderedPanel) {
        let document = &self.context.document;
        let root = self.root();

        let previous = self.inner.borrow_mut().panel.take();
        if let Some(previous) = previous {
            document.detach(&previous.panel);
        }
        for stale in find_panels(&root) {
            document.detach(&stale);
        }

        let inserted = self
            .context
            .locator
            .find_content_node(&root)
            .is_some_and(|content| document.insert_after(&content, &rendered.panel));
        if !inserted {
            document.append_child(&root, &rendered.panel);
        }

        self.inner.borrow_mut().panel = Some(rendered);
    }

    fn transition(&self, next: OverlayState) {
        let (previous, affordance) = {
            let mut inner = self.inner.borrow_mut();
            let previous = inner.state;
            inner.state = next;
            (previous, inner.affordance.clone())
        };
        apply_state(&self.context.document, &affordance, next);
        tracing::debug!(from = %previous, to = %next, "叠加层状态变更");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::future::Future;
    use std::time::Duration;

    use tokio::task::LocalSet;

    use crate::host::{LiveDocument, Notifier};
    use crate::locator::MessageLocator;
    use crate::parsers::html::dom::{get_node_attr, text_content};
    use crate::settings::{Settings, SettingsHandle};

    const MESSAGE: &str = r#"<li id="chat-messages-1"><div class="message-a1">
        <h3 class="header-x"><span class="username-y">ann</span></h3>
        <div class="messageContent-z">Hello<br>World</div>
    </div></li>"#;

    struct Scripted {
        outcomes: RefCell<Vec<TranslationOutcome>>,
        calls: Cell<usize>,
    }

    impl Translator for Scripted {
        fn translate(
            &self,
            _text: &str,
            _target_language: &str,
            _api_key: &str,
        ) -> impl Future<Output = TranslationOutcome> {
            self.calls.set(self.calls.get() + 1);
            let outcome = self.outcomes.borrow_mut().remove(0);
            async move { outcome }
        }
    }

    #[derive(Default)]
    struct Notices(RefCell<Vec<String>>);

    impl Notifier for Notices {
        fn notify(&self, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    fn controller(
        outcomes: Vec<TranslationOutcome>,
        api_key: &str,
    ) -> (MessageOverlayController<Scripted>, Rc<Notices>) {
        let document = Rc::new(LiveDocument::from_html(MESSAGE));
        let notices = Rc::new(Notices::default());
        let context = Rc::new(OverlayContext::new(
            document.clone(),
            Scripted {
                outcomes: RefCell::new(outcomes),
                calls: Cell::new(0),
            },
            SettingsHandle::new(Settings::new(api_key, "zh-CN")),
            notices.clone(),
            Duration::from_millis(3000),
        ));
        let locator = MessageLocator::new();
        let root = locator.find_message_roots(&document.document())[0].clone();
        let anchor = locator.find_anchor(&root).unwrap();
        (MessageOverlayController::attach(context, root, &anchor), notices)
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn success_cools_down_then_rearms() {
        LocalSet::new()
            .run_until(async {
                let (c, _) = controller(vec![Ok("你好\n世界".into())], "key");
                let task = c.activate().into_task().unwrap();
                assert_eq!(c.state(), OverlayState::Pending { retry: false });
                assert!(matches!(c.activate(), Activation::Busy(_)));

                task.await.unwrap();
                assert_eq!(c.state(), OverlayState::CoolDown);
                assert!(get_node_attr(&c.affordance(), "disabled").is_some());
                assert_eq!(c.last_extracted_text().unwrap().as_str(), "Hello\nWorld");

                tokio::time::sleep(Duration::from_millis(3001)).await;
                assert_eq!(c.state(), OverlayState::RetryArmed);
                assert_eq!(text_content(&c.affordance()), "重试");
                assert!(get_node_attr(&c.affordance(), "disabled").is_none());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn failure_rearms_immediately() {
        LocalSet::new()
            .run_until(async {
                let (c, _) = controller(
                    vec![Err(TranslationError::EmptyResult), Ok("好".into())],
                    "key",
                );
                c.activate().into_task().unwrap().await.unwrap();
                assert_eq!(c.state(), OverlayState::Errored);

                let retry = c.retry_control().unwrap();
                assert!(c.is_control(&retry));
                c.retry().into_task().unwrap().await.unwrap();
                assert_eq!(c.state(), OverlayState::CoolDown);
                assert!(text_content(&c.panel().unwrap()).starts_with("翻译 (重试)："));
                assert_eq!(find_panels(&c.root()).len(), 1);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn missing_key_notifies_and_stays_idle() {
        LocalSet::new()
            .run_until(async {
                let (c, notices) = controller(vec![], "  ");
                assert!(matches!(c.activate(), Activation::ConfigMissing));
                assert_eq!(c.state(), OverlayState::Idle);
                assert_eq!(c.requests_issued(), 0);
                assert_eq!(notices.0.borrow().as_slice(), ["请先设置API Key！"]);
            })
            .await;
    }
}
