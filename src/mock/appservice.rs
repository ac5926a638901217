//! Mock of the application service: the entry point test code builds first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::error::MockError;
use super::intent::IntentMock;
use super::recorder::{CallRecorder, Recorder};
use crate::args;
use crate::config::AppserviceMockOpts;

/// Used when the fixtures name no bot.
pub const DEFAULT_BOT_USER_ID: &str = "@bot:localhost";

/// Hands out intents and classifies user ids.
///
/// The bot intent is built up front. Every other intent is built on first
/// lookup and cached for the life of the mock; all of them share `opts`.
#[derive(Debug)]
pub struct AppserviceMock {
    opts: Arc<AppserviceMockOpts>,
    recorder: CallRecorder,
    bot_intent: Arc<IntentMock>,
    /// Suffixes and user ids share this map.
    intents: Mutex<HashMap<String, Arc<IntentMock>>>,
}

impl Default for AppserviceMock {
    fn default() -> Self {
        Self::new(AppserviceMockOpts::default())
    }
}

impl AppserviceMock {
    pub fn new(opts: AppserviceMockOpts) -> Self {
        let opts = Arc::new(opts);
        Self {
            bot_intent: Arc::new(IntentMock::new(Arc::clone(&opts))),
            opts,
            recorder: CallRecorder::new(),
            intents: Mutex::new(HashMap::new()),
        }
    }

    pub fn opts(&self) -> &Arc<AppserviceMockOpts> {
        &self.opts
    }

    /// An empty configured id counts as unset.
    pub fn bot_user_id(&self) -> &str {
        self.opts
            .bot_user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_BOT_USER_ID)
    }

    pub fn bot_intent(&self) -> &Arc<IntentMock> {
        &self.bot_intent
    }

    /// Whether `user_id` falls in the bridge's namespace.
    ///
    /// The call is recorded even when no prefix is configured. An empty
    /// prefix counts as unset.
    pub fn is_namespaced_user(&self, user_id: &str) -> Result<bool, MockError> {
        self.recorder.record("is_namespaced_user", args![user_id]);
        match self.opts.user_id_prefix.as_deref().filter(|p| !p.is_empty()) {
            Some(prefix) => Ok(user_id.starts_with(prefix)),
            None => {
                warn!("is_namespaced_user({user_id}) called without a user id prefix");
                Err(MockError::NoPrefix)
            }
        }
    }

    pub fn get_intent_for_suffix(&self, suffix: &str) -> Arc<IntentMock> {
        self.recorder.record("get_intent_for_suffix", args![suffix]);
        self.cached_intent(suffix)
    }

    pub fn get_intent(&self, user_id: &str) -> Arc<IntentMock> {
        self.recorder.record("get_intent", args![user_id]);
        self.cached_intent(user_id)
    }

    /// Number of cached intents, not counting the bot.
    pub fn intent_count(&self) -> usize {
        self.intents.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn cached_intent(&self, key: &str) -> Arc<IntentMock> {
        let mut intents = self.intents.lock().unwrap_or_else(|e| e.into_inner());
        let intent = intents.entry(key.to_string()).or_insert_with(|| {
            debug!("Creating intent for {key}");
            Arc::new(IntentMock::new(Arc::clone(&self.opts)))
        });
        Arc::clone(intent)
    }
}

impl Recorder for AppserviceMock {
    fn recorder(&self) -> &CallRecorder {
        &self.recorder
    }
}
