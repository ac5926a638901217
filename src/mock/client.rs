//! Mock of the low-level Matrix client.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::warn;

use super::api::MatrixClientApi;
use super::error::MockError;
use super::event::{MatrixEvent, RoomMembers, UserProfile};
use super::recorder::{CallRecorder, Recorder};
use crate::args;
use crate::config::AppserviceMockOpts;

const MXC_SCHEME: &str = "mxc://";
const HTTP_SCHEME: &str = "https://";

/// Records every client call; lookups are answered from the shared fixtures.
#[derive(Debug)]
pub struct MatrixClientMock {
    opts: Arc<AppserviceMockOpts>,
    recorder: CallRecorder,
}

impl MatrixClientMock {
    pub fn new(opts: Arc<AppserviceMockOpts>) -> Self {
        Self {
            opts,
            recorder: CallRecorder::new(),
        }
    }

    pub fn opts(&self) -> &Arc<AppserviceMockOpts> {
        &self.opts
    }
}

impl Recorder for MatrixClientMock {
    fn recorder(&self) -> &CallRecorder {
        &self.recorder
    }
}

impl MatrixClientApi for MatrixClientMock {
    type Error = MockError;

    fn ban_user(&self, room_id: &str, user_id: &str) {
        self.recorder.record("ban_user", args![room_id, user_id]);
    }

    fn unban_user(&self, room_id: &str, user_id: &str) {
        self.recorder.record("unban_user", args![room_id, user_id]);
    }

    fn kick_user(&self, room_id: &str, user_id: &str) {
        self.recorder.record("kick_user", args![room_id, user_id]);
    }

    fn leave_room(&self, room_id: &str) {
        self.recorder.record("leave_room", args![room_id]);
    }

    fn send_message(&self, room_id: &str, content: &Value) {
        self.recorder.record("send_message", args![room_id, content]);
    }

    fn send_event(&self, room_id: &str, body: &str, msgtype: &str) {
        self.recorder.record("send_event", args![room_id, body, msgtype]);
    }

    fn send_state_event(&self, room_id: &str, event_type: &str, state_key: &str, content: &Value) {
        self.recorder
            .record("send_state_event", args![room_id, event_type, state_key, content]);
    }

    fn set_avatar_url(&self, avatar_url: &str) {
        self.recorder.record("set_avatar_url", args![avatar_url]);
    }

    fn set_display_name(&self, display_name: &str) {
        self.recorder.record("set_display_name", args![display_name]);
    }

    /// The configured member list, whatever the room.
    fn get_room_members(&self, room_id: &str) -> RoomMembers {
        self.recorder.record("get_room_members", args![room_id]);
        RoomMembers {
            chunk: self.opts.room_members.clone(),
        }
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, MockError> {
        self.recorder.record("get_user_profile", args![user_id]);
        let Some(fetcher) = self.opts.profile_fetcher.clone() else {
            warn!("get_user_profile({user_id}) called without a profile fetcher");
            return Err(MockError::MissingFixture("profileFetcher"));
        };
        fetcher(user_id.to_string()).await
    }

    async fn get_room_state_event(
        &self,
        room_id: &str,
        event_type: &str,
        state_key: &str,
    ) -> Result<Value, MockError> {
        self.recorder
            .record("get_room_state_event", args![room_id, event_type, state_key]);
        let Some(fetcher) = self.opts.state_event_fetcher.clone() else {
            warn!("get_room_state_event({room_id}, {event_type}) called without a state fetcher");
            return Err(MockError::MissingFixture("stateEventFetcher"));
        };
        fetcher(room_id.to_string(), event_type.to_string(), state_key.to_string()).await
    }

    async fn get_event(&self, room_id: &str, event_id: &str) -> Result<MatrixEvent, MockError> {
        self.recorder.record("get_event", args![room_id, event_id]);
        let Some(fetcher) = self.opts.event_fetcher.clone() else {
            warn!("get_event({room_id}, {event_id}) called without an event fetcher");
            return Err(MockError::MissingFixture("getEvent"));
        };
        fetcher(room_id.to_string(), event_id.to_string()).await
    }

    /// Nothing is stored; the URI is derived from `filename` alone.
    async fn upload_content(
        &self,
        data: &[u8],
        content_type: &str,
        filename: &str,
    ) -> Result<String, MockError> {
        let encoded = STANDARD.encode(data);
        self.recorder
            .record("upload_content", args![encoded, content_type, filename]);
        Ok(format!("{MXC_SCHEME}{filename}"))
    }

    async fn mxc_url_to_http(&self, mxc_url: &str) -> Result<String, MockError> {
        self.recorder.record("mxc_url_to_http", args![mxc_url]);
        Ok(mxc_url.replacen(MXC_SCHEME, HTTP_SCHEME, 1))
    }
}

/// Recorded form of an upload payload, for matching `upload_content` calls.
pub fn upload_arg(data: &[u8]) -> Value {
    Value::String(STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> MatrixClientMock {
        MatrixClientMock::new(Arc::new(AppserviceMockOpts::default()))
    }

    #[test]
    fn test_fire_and_forget_calls_are_recorded() {
        let client = client();
        client.ban_user("!room:localhost", "@spam:localhost");
        client.unban_user("!room:localhost", "@spam:localhost");
        client.kick_user("!room:localhost", "@noisy:localhost");
        client.leave_room("!room:localhost");
        client.set_avatar_url("mxc://localhost/avatar");
        client.set_display_name("Bridge Bot");

        assert_eq!(
            client.was_called("ban_user", true, &args!["!room:localhost", "@spam:localhost"]),
            Ok(1)
        );
        assert_eq!(client.was_called("unban_user", true, &[]), Ok(1));
        assert_eq!(
            client.was_called("kick_user", true, &args!["!room:localhost", "@noisy:localhost"]),
            Ok(1)
        );
        assert_eq!(client.was_called("leave_room", true, &args!["!room:localhost"]), Ok(1));
        assert_eq!(client.was_called("set_avatar_url", true, &[]), Ok(1));
        assert_eq!(client.was_called("set_display_name", true, &args!["Bridge Bot"]), Ok(1));
    }

    #[test]
    fn test_send_calls_keep_full_arguments() {
        let client = client();
        let content = json!({"msgtype": "m.notice", "body": "bridged"});
        client.send_message("!room:localhost", &content);
        client.send_event("!room:localhost", "hello", "m.text");
        client.send_state_event("!room:localhost", "m.room.topic", "", &json!({"topic": "t"}));

        assert_eq!(client.calls("send_message"), vec![args!["!room:localhost", content]]);
        assert_eq!(
            client.was_called("send_event", true, &args!["!room:localhost", "hello", "m.text"]),
            Ok(1)
        );
        assert_eq!(
            client.was_called(
                "send_state_event",
                true,
                &args!["!room:localhost", "m.room.topic", "", json!({"topic": "t"})]
            ),
            Ok(1)
        );
    }

    #[test]
    fn test_room_members_ignore_room_id() {
        let members = vec![
            MatrixEvent::member("!a:localhost", "@alice:localhost", "join"),
            MatrixEvent::member("!a:localhost", "@bob:localhost", "leave"),
        ];
        let opts = AppserviceMockOpts::new().with_room_members(members.clone());
        let client = MatrixClientMock::new(Arc::new(opts));

        assert_eq!(client.get_room_members("!a:localhost").chunk, members);
        assert_eq!(client.get_room_members("!b:localhost").chunk, members);
        assert_eq!(client.was_called("get_room_members", true, &[]), Ok(2));
        assert_eq!(client.was_called("get_room_members", true, &args!["!b:localhost"]), Ok(1));
    }

    #[tokio::test]
    async fn test_missing_fetchers_fail_loudly() {
        let client = client();

        let err = client.get_event("!room:localhost", "$ev").await.unwrap_err();
        assert_eq!(err.to_string(), "No getEvent defined");

        let err = client
            .get_room_state_event("!room:localhost", "m.room.name", "")
            .await
            .unwrap_err();
        assert_eq!(err, MockError::MissingFixture("stateEventFetcher"));

        let err = client.get_user_profile("@alice:localhost").await.unwrap_err();
        assert_eq!(err, MockError::MissingFixture("profileFetcher"));

        // The calls are recorded even though they failed
        assert_eq!(client.was_called("get_event", true, &args!["!room:localhost", "$ev"]), Ok(1));
        assert_eq!(client.was_called("get_room_state_event", true, &[]), Ok(1));
        assert_eq!(client.was_called("get_user_profile", true, &[]), Ok(1));
    }

    #[tokio::test]
    async fn test_fetchers_are_delegated_to() {
        let opts = AppserviceMockOpts::new()
            .with_event_fetcher(|room_id, event_id| async move {
                Ok::<_, MockError>(MatrixEvent {
                    event_id,
                    room_id,
                    sender: "@alice:localhost".into(),
                    event_type: "m.room.message".into(),
                    state_key: None,
                    content: json!({"body": "fetched"}),
                    origin_server_ts: None,
                    unsigned: None,
                })
            })
            .with_state_event_fetcher(|_, state_type, _| async move {
                if state_type == "m.room.name" {
                    Ok(json!({"name": "Lobby"}))
                } else {
                    Err(MockError::Fixture(format!("no {state_type}")))
                }
            })
            .with_profile_fetcher(|user_id| async move {
                Ok::<_, MockError>(UserProfile {
                    displayname: Some(user_id),
                    avatar_url: None,
                })
            });
        let client = MatrixClientMock::new(Arc::new(opts));

        let event = client.get_event("!room:localhost", "$ev").await.unwrap();
        assert_eq!(event.event_id, "$ev");
        assert_eq!(event.room_id, "!room:localhost");
        assert_eq!(event.content["body"], "fetched");

        let name = client
            .get_room_state_event("!room:localhost", "m.room.name", "")
            .await
            .unwrap();
        assert_eq!(name, json!({"name": "Lobby"}));

        // Fixture errors come back unchanged
        let err = client
            .get_room_state_event("!room:localhost", "m.room.topic", "")
            .await
            .unwrap_err();
        assert_eq!(err, MockError::Fixture("no m.room.topic".into()));

        let profile = client.get_user_profile("@alice:localhost").await.unwrap();
        assert_eq!(profile.displayname.as_deref(), Some("@alice:localhost"));
    }

    #[tokio::test]
    async fn test_upload_content() {
        let client = client();
        let uri = client.upload_content(b"\x89PNG", "image/png", "cat.png").await.unwrap();
        assert_eq!(uri, "mxc://cat.png");

        let expected = vec![upload_arg(b"\x89PNG"), json!("image/png"), json!("cat.png")];
        assert_eq!(client.was_called("upload_content", true, &expected), Ok(1));
    }

    #[tokio::test]
    async fn test_mxc_url_to_http() {
        let client = client();
        let url = client.mxc_url_to_http("mxc://example.com/abc").await.unwrap();
        assert_eq!(url, "https://example.com/abc");

        // Only the scheme is rewritten
        let url = client.mxc_url_to_http("mxc://example.com/mxc://x").await.unwrap();
        assert_eq!(url, "https://example.com/mxc://x");

        assert_eq!(client.was_called("mxc_url_to_http", true, &[]), Ok(2));
    }
}
