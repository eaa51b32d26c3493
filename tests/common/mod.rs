// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use chat_overlay::core::OverlayConfig;
use chat_overlay::discovery::DiscoveryLoop;
use chat_overlay::host::{LiveDocument, Notifier};
use chat_overlay::parsers::html::dom::{class_contains, get_node_attr, get_node_name};
use chat_overlay::settings::{Settings, SettingsHandle};
use chat_overlay::translation::{TranslationOutcome, Translator};

use markup5ever_rcdom::Handle;

/// HTML测试工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 两条新版结构的消息（文本相同）、一条旧版结构的消息和一个分隔条
    pub fn create_chat_page() -> String {
        r#"<!DOCTYPE html>
<html>
<body>
<div class="app-2rEoOp">
  <ol class="scrollerInner-2PPAp2" data-list-id="chat-messages">
    <li id="chat-messages-1" class="messageListItem-ZZ7v6g">
      <div class="message-2CShn3 cozyMessage-1DWF9U">
        <div class="contents-2MsGLg">
          <img class="avatar-2e8lTP" src="a.png" alt="">
          <h3 class="header-2jRmjb"><span class="headerText-2z4IhQ"><span class="username-h_Y3Us">alice</span></span><span class="timestamp-p1Df1m"><time datetime="2024-01-01T10:00:00Z">Today at 10:00</time></span></h3>
          <div id="message-content-1" class="markup-eYLPri messageContent-2t3eCI">Hello <strong>world</strong><br>second line</div>
        </div>
      </div>
    </li>
    <li id="chat-messages-2" class="messageListItem-ZZ7v6g">
      <div class="message-2CShn3 cozyMessage-1DWF9U">
        <div class="contents-2MsGLg">
          <h3 class="header-2jRmjb"><span class="username-h_Y3Us">bob</span></h3>
          <div id="message-content-2" class="markup-eYLPri messageContent-2t3eCI">Hello <strong>world</strong><br>second line</div>
        </div>
      </div>
    </li>
    <li id="legacy-1"><div class="message-legacy-9f3a">
      <div class="markup-0b1c">Legacy <code>x = 1</code> message</div>
    </div></li>
    <li id="chat-messages-divider"><div class="divider-3_HH5L">-</div></li>
  </ol>
</div>
</body>
</html>"#
            .to_string()
    }

    /// 一条新版结构的消息，用于增量插入
    pub fn message_fragment(id: usize, text: &str) -> String {
        format!(
            r#"<li id="chat-messages-{id}" class="messageListItem-ZZ7v6g"><div class="message-2CShn3"><h3 class="header-2jRmjb"><span class="username-h_Y3Us">carol</span></h3><div class="messageContent-2t3eCI">{text}</div></div></li>"#
        )
    }

    /// 把片段解析后移入 `host` 文档，顶层元素追加到 `parent`
    pub fn append_fragment(host: &LiveDocument, parent: &Handle, fragment: &str) -> Vec<Handle> {
        let scratch = LiveDocument::from_html(fragment);
        let body = scratch
            .find_first(|n| get_node_name(n) == Some("body"))
            .expect("scratch body");
        let nodes: Vec<Handle> = body.children.borrow().iter().cloned().collect();
        for node in &nodes {
            scratch.detach(node);
            host.append_child(parent, node);
        }
        nodes
    }

    pub fn by_id(document: &LiveDocument, id: &str) -> Handle {
        document
            .find_first(|n| get_node_attr(n, "id").as_deref() == Some(id))
            .unwrap_or_else(|| panic!("element #{} not found", id))
    }

    pub fn by_class(document: &LiveDocument, fragment: &str) -> Handle {
        document
            .find_first(|n| class_contains(n, fragment))
            .unwrap_or_else(|| panic!("element .{} not found", fragment))
    }
}

/// 脚本化翻译器
///
/// 按顺序返回预设结果；预设用完后返回 `[target] text`。
#[derive(Clone, Default)]
pub struct ScriptedTranslator {
    state: Rc<ScriptState>,
}

#[derive(Default)]
struct ScriptState {
    outcomes: RefCell<VecDeque<TranslationOutcome>>,
    delay: Cell<Option<Duration>>,
    calls: Cell<usize>,
    texts: RefCell<Vec<String>>,
}

impl ScriptedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes(outcomes: Vec<TranslationOutcome>) -> Self {
        let translator = Self::new();
        translator.state.outcomes.borrow_mut().extend(outcomes);
        translator
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.delay.set(Some(delay));
        self
    }

    pub fn push(&self, outcome: TranslationOutcome) {
        self.state.outcomes.borrow_mut().push_back(outcome);
    }

    pub fn calls(&self) -> usize {
        self.state.calls.get()
    }

    pub fn texts(&self) -> Vec<String> {
        self.state.texts.borrow().clone()
    }
}

impl Translator for ScriptedTranslator {
    fn translate(
        &self,
        text: &str,
        target_language: &str,
        _api_key: &str,
    ) -> impl Future<Output = TranslationOutcome> {
        self.state.calls.set(self.state.calls.get() + 1);
        self.state.texts.borrow_mut().push(text.to_string());

        let outcome = self
            .state
            .outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("[{}] {}", target_language, text)));
        let delay = self.state.delay.get();

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            outcome
        }
    }
}

/// 记录所有提示的通知器
#[derive(Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}

/// 测试环境
pub struct TestEnvironment {
    pub document: Rc<LiveDocument>,
    pub translator: ScriptedTranslator,
    pub notifier: Rc<RecordingNotifier>,
    pub settings: SettingsHandle,
    pub discovery: Rc<DiscoveryLoop<ScriptedTranslator>>,
}

impl TestEnvironment {
    pub fn new(html: &str, translator: ScriptedTranslator, api_key: &str) -> Self {
        Self::with_config(html, translator, api_key, Self::fast_config())
    }

    pub fn with_config(
        html: &str,
        translator: ScriptedTranslator,
        api_key: &str,
        config: OverlayConfig,
    ) -> Self {
        let document = Rc::new(LiveDocument::from_html(html));
        let notifier = Rc::new(RecordingNotifier::default());
        let settings = SettingsHandle::new(Settings::new(api_key, "zh-CN"));
        let discovery = Rc::new(DiscoveryLoop::new(
            Rc::clone(&document),
            translator.clone(),
            settings.clone(),
            notifier.clone(),
            config,
        ));

        Self {
            document,
            translator,
            notifier,
            settings,
            discovery,
        }
    }

    pub fn chat_page(translator: ScriptedTranslator) -> Self {
        Self::new(&HtmlTestHelper::create_chat_page(), translator, "test-key")
    }

    /// 默认时序，但不轮询就绪
    pub fn fast_config() -> OverlayConfig {
        OverlayConfig {
            wait_for_ready: false,
            ..OverlayConfig::default()
        }
    }
}
