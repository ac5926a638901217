//! Mock of a per-user intent.

use std::sync::Arc;

use super::api::IntentApi;
use super::client::MatrixClientMock;
use super::recorder::{CallRecorder, Recorder};
use crate::args;
use crate::config::AppserviceMockOpts;

/// One acting identity with its own client.
///
/// Intent calls are recorded here only; they are not forwarded to
/// [`underlying_client`](IntentApi::underlying_client).
#[derive(Debug)]
pub struct IntentMock {
    recorder: CallRecorder,
    underlying_client: MatrixClientMock,
}

impl IntentMock {
    pub fn new(opts: Arc<AppserviceMockOpts>) -> Self {
        Self {
            recorder: CallRecorder::new(),
            underlying_client: MatrixClientMock::new(opts),
        }
    }
}

impl Recorder for IntentMock {
    fn recorder(&self) -> &CallRecorder {
        &self.recorder
    }
}

impl IntentApi for IntentMock {
    type Client = MatrixClientMock;

    fn underlying_client(&self) -> &MatrixClientMock {
        &self.underlying_client
    }

    fn join(&self) {
        self.recorder.record("join", args![]);
    }

    // Tracked apart from `join`; tests assert on either name.
    fn join_room(&self) {
        self.recorder.record("join_room", args![]);
    }

    fn leave(&self) {
        self.recorder.record("leave", args![]);
    }

    fn send_text(&self, room_id: &str, body: &str) {
        self.recorder.record("send_text", args![room_id, body]);
    }

    fn send_event(&self, room_id: &str, body: &str) {
        self.recorder.record("send_event", args![room_id, body]);
    }
}
