use std::error::Error;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::discovery::DiscoveryLoop;
use crate::env::{load_dotenv, EnvConfig, EnvError};
use crate::host::{mutation_channel, LiveDocument, MutationSender, Notifier};
use crate::logging;
use crate::settings::{Settings, SettingsError, SettingsHandle, SettingsStore};
use crate::translation::{ClientConfig, GeminiClient, TranslationError, Translator};

/// Represents errors that can occur while bootstrapping the overlay
#[derive(Debug)]
pub enum OverlayError {
    Env(EnvError),
    Settings(SettingsError),
    Client(TranslationError),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OverlayError::Env(e) => write!(f, "{}", e),
            OverlayError::Settings(e) => write!(f, "{}", e),
            OverlayError::Client(e) => write!(f, "{}", e),
        }
    }
}

impl Error for OverlayError {}

impl From<EnvError> for OverlayError {
    fn from(e: EnvError) -> Self {
        OverlayError::Env(e)
    }
}

impl From<SettingsError> for OverlayError {
    fn from(e: SettingsError) -> Self {
        OverlayError::Settings(e)
    }
}

impl From<TranslationError> for OverlayError {
    fn from(e: TranslationError) -> Self {
        OverlayError::Client(e)
    }
}

/// Timing and filtering options of the overlay engine
///
/// All delays are measured on the tokio clock, so tests running with a
/// paused clock see them advance deterministically.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    /// Poll for the host app shell before the initial scan
    pub wait_for_ready: bool,
    pub ready_poll_interval: Duration,
    /// Delay between readiness and the initial scan
    pub settle_delay: Duration,
    /// Delay between the first mutation batch of a burst and its scan
    pub debounce: Duration,
    /// Period of the safety-net scan
    pub fallback_period: Duration,
    /// Post-success window during which the affordance stays disabled
    pub cool_down: Duration,
    /// Minimum extracted characters for a message to be instrumented
    pub min_content_chars: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            wait_for_ready: true,
            ready_poll_interval: Duration::from_millis(1000),
            settle_delay: Duration::from_millis(2000),
            debounce: Duration::from_millis(100),
            fallback_period: Duration::from_secs(10),
            cool_down: Duration::from_millis(3000),
            min_content_chars: 2,
        }
    }
}

impl OverlayConfig {
    /// Builds the options from an already loaded environment summary
    pub fn from_env_config(env: &EnvConfig) -> Self {
        Self {
            settle_delay: env.settle_delay,
            debounce: env.debounce,
            fallback_period: env.fallback_period,
            cool_down: env.cool_down,
            ..Default::default()
        }
    }
}

/// Configuration resolved from the environment and the settings store
pub struct Bootstrap {
    pub overlay: OverlayConfig,
    pub client: GeminiClient,
    pub settings: SettingsHandle,
}

/// Loads `.env`, installs logging and resolves every configuration layer
///
/// Environment overrides win over stored settings.
pub fn bootstrap_from_env(store: &dyn SettingsStore) -> Result<Bootstrap, OverlayError> {
    load_dotenv();
    let env = EnvConfig::from_env()?;
    logging::init(&env.log_level);
    env.log_summary();

    let settings = Settings::load(store)?.with_env_overrides(&env);
    if !settings.has_api_key() {
        tracing::warn!("尚未配置 API Key，点击翻译时将提示用户设置");
    }

    Ok(Bootstrap {
        overlay: OverlayConfig::from_env_config(&env),
        client: GeminiClient::new(ClientConfig::from_env_config(&env))?,
        settings: SettingsHandle::new(settings),
    })
}

/// A running overlay engine
pub struct OverlayRuntime<T: Translator + 'static> {
    pub discovery: Rc<DiscoveryLoop<T>>,
    /// Feed for host mutation batches; dropping every sender stops the loop
    pub mutations: MutationSender,
    pub task: JoinHandle<()>,
}

/// Wires the engine together and spawns the discovery loop
///
/// Must be called from within a `tokio::task::LocalSet`.
pub fn start<T: Translator + 'static>(
    document: Rc<LiveDocument>,
    translator: T,
    settings: SettingsHandle,
    notifier: Rc<dyn Notifier>,
    config: OverlayConfig,
) -> OverlayRuntime<T> {
    let (mutations, receiver) = mutation_channel();
    let discovery = Rc::new(DiscoveryLoop::new(
        document, translator, settings, notifier, config,
    ));
    let task = tokio::task::spawn_local(Rc::clone(&discovery).run(receiver));

    OverlayRuntime {
        discovery,
        mutations,
        task,
    }
}
