//! Call-recording doubles for the Matrix bridge client stack.

pub mod api;
pub mod appservice;
pub mod client;
pub mod error;
pub mod event;
pub mod intent;
pub mod recorder;

pub use api::{IntentApi, MatrixClientApi};
pub use appservice::{AppserviceMock, DEFAULT_BOT_USER_ID};
pub use client::{MatrixClientMock, upload_arg};
pub use error::MockError;
pub use event::{MatrixEvent, RoomMembers, UserProfile};
pub use intent::IntentMock;
pub use recorder::{CallArgs, CallRecorder, RecordedCall, Recorder};
