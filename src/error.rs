//! Error types shared by the Choreo client and the tool dispatcher.
//!
//! ArgumentError  - caller supplied a missing / mistyped / invalid parameter
//! ChoreoError    - a single remote operation failed (transport, status, decode)
//! ToolError      - what a tool invocation reports back to its caller

use thiserror::Error;

/// Why a single parameter was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentProblem {
    Missing,
    WrongType { found: &'static str },
    Invalid(String),
}

/// A tool parameter was missing, had the wrong JSON type, or failed validation.
///
/// Always raised before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.param, .problem))]
pub struct ArgumentError {
    pub param: String,
    pub problem: ArgumentProblem,
}

impl ArgumentError {
    pub fn missing(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            problem: ArgumentProblem::Missing,
        }
    }

    pub fn wrong_type(param: impl Into<String>, found: &'static str) -> Self {
        Self {
            param: param.into(),
            problem: ArgumentProblem::WrongType { found },
        }
    }

    pub fn invalid(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            problem: ArgumentProblem::Invalid(reason.into()),
        }
    }
}

fn describe(param: &str, problem: &ArgumentProblem) -> String {
    match problem {
        ArgumentProblem::Missing => format!("missing required parameter: {param}"),
        ArgumentProblem::WrongType { found } => {
            format!("parameter '{param}' must be a string (got {found})")
        }
        ArgumentProblem::Invalid(reason) => format!("invalid parameter '{param}': {reason}"),
    }
}

/// Failure of one remote Choreo API call.
#[derive(Debug, Error)]
pub enum ChoreoError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error("failed to send request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected status code: {status}, body: {body}")]
    Remote { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("graphql error: {}", .messages.join("; "))]
    GraphQl { messages: Vec<String> },
}

impl ChoreoError {
    /// HTTP status for `Remote` failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ChoreoError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result of a tool invocation that did not produce output.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error("failed to {operation}: {source}")]
    Operation {
        operation: &'static str,
        source: ChoreoError,
    },
}

impl ToolError {
    /// Wrap a client failure with the operation it belongs to.
    ///
    /// Validation failures raised by the client keep their argument identity
    /// so callers can tell them apart from remote failures.
    pub fn operation(operation: &'static str, source: ChoreoError) -> Self {
        match source {
            ChoreoError::Argument(e) => ToolError::Argument(e),
            other => ToolError::Operation {
                operation,
                source: other,
            },
        }
    }

    /// HTTP status of the underlying remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ToolError::Operation { source, .. } => source.status(),
            _ => None,
        }
    }

    /// True when the caller can fix the call by changing its arguments.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, ToolError::UnknownTool(_) | ToolError::Argument(_))
    }
}
