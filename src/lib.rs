//! Call-recording mocks of a Matrix application service, its intents and
//! their low-level clients.
//!
//! ```
//! use appservice_mock::{args, AppserviceMock, AppserviceMockOpts, IntentApi, Recorder};
//!
//! let opts = AppserviceMockOpts::new().with_user_id_prefix("@_bridge_");
//! let appservice = AppserviceMock::new(opts);
//! let intent = appservice.get_intent("@_bridge_alice:localhost");
//! intent.send_text("!room:localhost", "hello");
//!
//! assert_eq!(intent.was_called("send_text", true, &args!["!room:localhost", "hello"]), Ok(1));
//! assert_eq!(appservice.is_namespaced_user("@_bridge_alice:localhost"), Ok(true));
//! ```

pub mod config;
pub mod logging;
pub mod mock;

pub use config::{AppserviceMockOpts, ConfigError};
pub use mock::{
    AppserviceMock, CallArgs, CallRecorder, IntentApi, IntentMock, MatrixClientApi,
    MatrixClientMock, MatrixEvent, MockError, Recorder, RoomMembers, UserProfile,
};
