//! User-visible outcomes of an action
//!
//! Every action ends in exactly one notice. Failures never escape the action
//! boundary as anything else.

use std::fmt;

/// Classification of an action failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or missing wallet, detected before any RPC call
    Precondition,
    /// A dependency has not loaded yet; the action is refused
    Loading,
    /// Wallet, node or store failure
    Transport,
}

/// What the user sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Error(String),
}

impl Notice {
    /// Notice for a failure of the given kind
    pub fn for_failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        match kind {
            ErrorKind::Precondition | ErrorKind::Loading => Notice::Info(message.into()),
            ErrorKind::Transport => Notice::Error(message.into()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Info(m) | Notice::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Success(m) => write!(f, "✅ {}", m),
            Notice::Info(m) => write!(f, "ℹ️  {}", m),
            Notice::Error(m) => write!(f, "❌ {}", m),
        }
    }
}
