use std::fmt;

use tokio::sync::mpsc;

/// Receiving end of the notice channel handed to the presentation layer.
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Category of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// An operation succeeded
    Info,
    /// Input was rejected before any remote call
    Validation,
    /// A remote call failed
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::Info => write!(f, "info"),
            NoticeKind::Validation => write!(f, "notice"),
            NoticeKind::Error => write!(f, "error"),
        }
    }
}

/// A message for the user about the outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// True for notices the user must acknowledge (validation and errors).
    pub fn is_blocking(&self) -> bool {
        self.kind != NoticeKind::Info
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
