//! Notification capability
//!
//! Blocking user-facing alerts and confirmations. The API client raises the
//! unauthorized and not-found alerts itself; views raise everything else.

use std::sync::Mutex;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized access - redirecting to login";
pub const NOT_FOUND_MESSAGE: &str = "Page not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    /// Show an alert and return once the user has seen it
    fn notify(&self, notice: Notice);

    /// Ask a yes/no question; `true` means proceed
    fn confirm(&self, prompt: &str) -> bool;
}

/// Notifier that records every call, for tests and non-interactive callers
#[derive(Debug)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
    prompts: Mutex<Vec<String>>,
    confirm_answer: bool,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RecordingNotifier {
    /// `confirm_answer` is returned from every confirmation
    pub fn new(confirm_answer: bool) -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            confirm_answer,
        }
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    /// Number of notices carrying exactly `message`
    pub fn count(&self, message: &str) -> usize {
        self.notices()
            .iter()
            .filter(|notice| notice.message == message)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.confirm_answer
    }
}
