//! Call recording shared by every mock.
//!
//! Each invocation is stored under its operation name as a list of JSON
//! values, so argument matching is structural rather than by identity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::MockError;

/// Arguments of one invocation, in call order.
pub type CallArgs = Vec<Value>;

/// Build a [`CallArgs`] list from anything serializable.
///
/// An argument that fails to serialize is recorded as a unique marker, so it
/// never matches another argument.
///
/// ```
/// use appservice_mock::args;
/// let args = args!["!room:localhost", "@alice:localhost"];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => { $crate::mock::recorder::CallArgs::new() };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::mock::recorder::to_arg(&$arg)),+]
    };
}

static UNSERIALIZABLE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Convert a single argument to its recorded form.
pub fn to_arg<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        let seq = UNSERIALIZABLE_SEQ.fetch_add(1, Ordering::Relaxed);
        warn!("Argument could not be recorded as JSON: {e}");
        serde_json::json!({ "unserializable": e.to_string(), "seq": seq })
    })
}

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub args: CallArgs,
    /// When the call was recorded. Not used for matching.
    pub recorded_at: DateTime<Utc>,
}

/// Operation name to invocations, in call order.
#[derive(Debug, Default)]
pub struct CallRecorder {
    calls: Mutex<HashMap<String, Vec<RecordedCall>>>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<RecordedCall>>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record(&self, operation: &str, args: CallArgs) {
        debug!("📞 {}({})", operation, format_args_list(&args));
        self.lock()
            .entry(operation.to_string())
            .or_default()
            .push(RecordedCall { args, recorded_at: Utc::now() });
    }

    /// Count invocations of `operation`.
    ///
    /// With empty `args` every invocation counts; otherwise only those whose
    /// argument list equals `args`. When `throw_on_missing` is set a zero count
    /// is an error instead.
    pub fn was_called(
        &self,
        operation: &str,
        throw_on_missing: bool,
        args: &[Value],
    ) -> Result<usize, MockError> {
        let calls = self.lock();
        let Some(called) = calls.get(operation) else {
            if throw_on_missing {
                return Err(MockError::NotCalled { operation: operation.to_string() });
            }
            return Ok(0);
        };
        if args.is_empty() {
            return Ok(called.len());
        }

        let matching = called.iter().filter(|call| call.args.as_slice() == args).count();
        if matching == 0 && throw_on_missing {
            return Err(MockError::NotCalledWithParameters { operation: operation.to_string() });
        }
        Ok(matching)
    }

    /// Legacy negative assertion.
    ///
    /// `args` are handed to [`was_called`](Self::was_called) as a single
    /// argument holding the whole list, so this only matches invocations that
    /// took exactly one argument equal to `args`. In practice it returns
    /// `Ok(true)` for anything else, including operations that were called.
    /// Use [`was_not_called_with`](Self::was_not_called_with) for the plain
    /// "never called (with these args)" check.
    pub fn was_not_called(
        &self,
        operation: &str,
        throw_on_found: bool,
        args: &[Value],
    ) -> Result<bool, MockError> {
        let nested = [Value::Array(args.to_vec())];
        self.not_called(operation, throw_on_found, &nested)
    }

    /// Succeeds when no invocation matches `args`, or when there were no
    /// invocations at all if `args` is empty.
    pub fn was_not_called_with(
        &self,
        operation: &str,
        throw_on_found: bool,
        args: &[Value],
    ) -> Result<bool, MockError> {
        self.not_called(operation, throw_on_found, args)
    }

    fn not_called(
        &self,
        operation: &str,
        throw_on_found: bool,
        args: &[Value],
    ) -> Result<bool, MockError> {
        if self.was_called(operation, false, args)? > 0 {
            if throw_on_found {
                return Err(MockError::WasCalled { operation: operation.to_string() });
            }
            return Ok(false);
        }
        Ok(true)
    }

    /// Argument lists recorded for `operation`.
    pub fn calls(&self, operation: &str) -> Vec<CallArgs> {
        self.lock()
            .get(operation)
            .map(|calls| calls.iter().map(|call| call.args.clone()).collect())
            .unwrap_or_default()
    }

    pub fn recorded(&self, operation: &str) -> Vec<RecordedCall> {
        self.lock().get(operation).cloned().unwrap_or_default()
    }

    pub fn reset(&self) {
        self.lock().clear();
    }
}

fn format_args_list(args: &[Value]) -> String {
    args.iter().map(Value::to_string).collect::<Vec<_>>().join(", ")
}

/// Query surface for anything that records its calls.
pub trait Recorder {
    fn recorder(&self) -> &CallRecorder;

    fn was_called(
        &self,
        operation: &str,
        throw_on_missing: bool,
        args: &[Value],
    ) -> Result<usize, MockError> {
        self.recorder().was_called(operation, throw_on_missing, args)
    }

    fn was_not_called(
        &self,
        operation: &str,
        throw_on_found: bool,
        args: &[Value],
    ) -> Result<bool, MockError> {
        self.recorder().was_not_called(operation, throw_on_found, args)
    }

    fn was_not_called_with(
        &self,
        operation: &str,
        throw_on_found: bool,
        args: &[Value],
    ) -> Result<bool, MockError> {
        self.recorder().was_not_called_with(operation, throw_on_found, args)
    }

    fn calls(&self, operation: &str) -> Vec<CallArgs> {
        self.recorder().calls(operation)
    }

    fn recorded(&self, operation: &str) -> Vec<RecordedCall> {
        self.recorder().recorded(operation)
    }

    fn reset(&self) {
        self.recorder().reset()
    }
}
