use std::fmt;

/// Errors raised by the mocks.
///
/// Assertion failures and missing fixtures are both hard errors: a test that
/// hits one should fail at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockError {
    /// `was_called` found no invocation of the operation.
    NotCalled { operation: String },
    /// The operation was invoked, but never with the expected arguments.
    NotCalledWithParameters { operation: String },
    /// `was_not_called` found an invocation.
    WasCalled { operation: String },
    /// A delegating operation ran without its fetcher configured.
    MissingFixture(&'static str),
    /// `is_namespaced_user` ran without a user id prefix configured.
    NoPrefix,
    /// A fixture callback reported a failure of its own.
    Fixture(String),
}

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotCalled { operation } => write!(f, "{} was not called", operation),
            Self::NotCalledWithParameters { operation } => {
                write!(f, "{} was not called with the correct parameters", operation)
            }
            Self::WasCalled { operation } => write!(f, "{} was called", operation),
            Self::MissingFixture(name) => write!(f, "No {} defined", name),
            Self::NoPrefix => write!(f, "No prefix defined"),
            Self::Fixture(msg) => write!(f, "fixture error: {}", msg),
        }
    }
}

impl std::error::Error for MockError {}
