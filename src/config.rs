use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;

use crate::mock::error::MockError;
use crate::mock::event::{MatrixEvent, UserProfile};

/// Future returned by a fixture callback.
pub type FixtureFuture<T> = Pin<Box<dyn Future<Output = Result<T, MockError>> + Send>>;

/// `(room_id, state_type, state_key)` to state event content.
pub type StateEventFetcher =
    Arc<dyn Fn(String, String, String) -> FixtureFuture<Value> + Send + Sync>;
/// `(room_id, event_id)` to event.
pub type EventFetcher = Arc<dyn Fn(String, String) -> FixtureFuture<MatrixEvent> + Send + Sync>;
/// `user_id` to profile.
pub type ProfileFetcher = Arc<dyn Fn(String) -> FixtureFuture<UserProfile> + Send + Sync>;

/// Errors that can occur when loading a fixture file.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the fixture file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read fixture file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse fixture file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "fixture validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct FixtureFile {
    /// Member events returned by `get_room_members`
    #[serde(default, alias = "roommembers")]
    room_members: Vec<MatrixEvent>,
    bot_user_id: Option<String>,
    user_id_prefix: Option<String>,
    /// Events served by `get_event`, keyed by room and event id
    #[serde(default)]
    events: Vec<MatrixEvent>,
    /// State events served by `get_room_state_event`
    #[serde(default)]
    state: Vec<MatrixEvent>,
    #[serde(default)]
    profiles: HashMap<String, UserProfile>,
}

/// Fixtures shared by an appservice mock and everything it creates.
///
/// Immutable once handed to [`AppserviceMock::new`](crate::mock::AppserviceMock::new).
#[derive(Clone, Default)]
pub struct AppserviceMockOpts {
    pub room_members: Vec<MatrixEvent>,
    pub state_event_fetcher: Option<StateEventFetcher>,
    pub event_fetcher: Option<EventFetcher>,
    pub profile_fetcher: Option<ProfileFetcher>,
    pub bot_user_id: Option<String>,
    pub user_id_prefix: Option<String>,
}

impl fmt::Debug for AppserviceMockOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppserviceMockOpts")
            .field("room_members", &self.room_members.len())
            .field("state_event_fetcher", &self.state_event_fetcher.is_some())
            .field("event_fetcher", &self.event_fetcher.is_some())
            .field("profile_fetcher", &self.profile_fetcher.is_some())
            .field("bot_user_id", &self.bot_user_id)
            .field("user_id_prefix", &self.user_id_prefix)
            .finish()
    }
}

impl AppserviceMockOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_room_members(mut self, members: Vec<MatrixEvent>) -> Self {
        self.room_members = members;
        self
    }

    pub fn with_bot_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.bot_user_id = Some(user_id.into());
        self
    }

    pub fn with_user_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_id_prefix = Some(prefix.into());
        self
    }

    pub fn with_state_event_fetcher<F, Fut>(mut self, fetcher: F) -> Self
    where
        F: Fn(String, String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, MockError>> + Send + 'static,
    {
        self.state_event_fetcher = Some(Arc::new(
            move |room_id: String, state_type: String, state_key: String| -> FixtureFuture<Value> {
                Box::pin(fetcher(room_id, state_type, state_key))
            },
        ));
        self
    }

    pub fn with_event_fetcher<F, Fut>(mut self, fetcher: F) -> Self
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<MatrixEvent, MockError>> + Send + 'static,
    {
        self.event_fetcher = Some(Arc::new(
            move |room_id: String, event_id: String| -> FixtureFuture<MatrixEvent> {
                Box::pin(fetcher(room_id, event_id))
            },
        ));
        self
    }

    pub fn with_profile_fetcher<F, Fut>(mut self, fetcher: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<UserProfile, MockError>> + Send + 'static,
    {
        self.profile_fetcher = Some(Arc::new(move |user_id: String| -> FixtureFuture<UserProfile> {
            Box::pin(fetcher(user_id))
        }));
        self
    }

    /// Load fixtures from a JSON file.
    ///
    /// Static `events`, `state` and `profiles` tables become fetchers that
    /// fail with [`MockError::Fixture`] when asked for an unknown key.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::ReadFile { path: path.clone(), source: e })?;
        let file: FixtureFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: path.clone(), source: e })?;

        if let Some(ref user_id) = file.bot_user_id {
            if !is_valid_user_id(user_id) {
                return Err(ConfigError::Validation(format!(
                    "bot_user_id '{}' is not a user id (expected @localpart:server)",
                    user_id
                )));
            }
        }
        if file.user_id_prefix.as_deref() == Some("") {
            return Err(ConfigError::Validation("user_id_prefix must not be empty".into()));
        }
        if let Some(event) = file.state.iter().find(|e| e.state_key.is_none()) {
            return Err(ConfigError::Validation(format!(
                "state event of type '{}' in '{}' has no state_key",
                event.event_type, event.room_id
            )));
        }

        info!(
            "Loaded fixtures from {}: {} members, {} events, {} state events, {} profiles",
            path.display(),
            file.room_members.len(),
            file.events.len(),
            file.state.len(),
            file.profiles.len()
        );

        let mut opts = Self {
            room_members: file.room_members,
            bot_user_id: file.bot_user_id,
            user_id_prefix: file.user_id_prefix,
            ..Self::default()
        };

        if !file.events.is_empty() {
            let table: Arc<HashMap<(String, String), MatrixEvent>> = Arc::new(
                file.events
                    .into_iter()
                    .map(|e| ((e.room_id.clone(), e.event_id.clone()), e))
                    .collect(),
            );
            opts = opts.with_event_fetcher(move |room_id, event_id| {
                let table = Arc::clone(&table);
                async move {
                    table
                        .get(&(room_id.clone(), event_id.clone()))
                        .cloned()
                        .ok_or_else(|| {
                            MockError::Fixture(format!("no event {} in {}", event_id, room_id))
                        })
                }
            });
        }

        if !file.state.is_empty() {
            let table: Arc<HashMap<(String, String, String), Value>> = Arc::new(
                file.state
                    .into_iter()
                    .map(|e| {
                        let key = (e.room_id, e.event_type, e.state_key.unwrap_or_default());
                        (key, e.content)
                    })
                    .collect(),
            );
            opts = opts.with_state_event_fetcher(move |room_id, state_type, state_key| {
                let table = Arc::clone(&table);
                async move {
                    let key = (room_id, state_type, state_key);
                    table.get(&key).cloned().ok_or_else(|| {
                        MockError::Fixture(format!(
                            "no {} state with key '{}' in {}",
                            key.1, key.2, key.0
                        ))
                    })
                }
            });
        }

        if !file.profiles.is_empty() {
            let table = Arc::new(file.profiles);
            opts = opts.with_profile_fetcher(move |user_id| {
                let table = Arc::clone(&table);
                async move {
                    table
                        .get(&user_id)
                        .cloned()
                        .ok_or_else(|| MockError::Fixture(format!("no profile for {}", user_id)))
                }
            });
        }

        Ok(opts)
    }
}

/// `@localpart:server` with both parts non-empty.
fn is_valid_user_id(user_id: &str) -> bool {
    match user_id.strip_prefix('@').and_then(|rest| rest.split_once(':')) {
        Some((localpart, server)) => !localpart.is_empty() && !server.is_empty(),
        None => false,
    }
}
