//! Transient notifications.
//!
//! Every remote call ends in a toast: a success message or the error text.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// One notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
    pub created_at: Instant,
}

impl Toast {
    pub fn success(title: &str, description: &str) -> Self {
        Self::new(ToastKind::Success, title, description)
    }

    pub fn error(title: &str, description: impl ToString) -> Self {
        Self::new(ToastKind::Error, title, &description.to_string())
    }

    fn new(kind: ToastKind, title: &str, description: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.to_string(),
            created_at: Instant::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == ToastKind::Error
    }

    /// Single-line rendering for the status bar.
    pub fn line(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{}: {}", self.title, self.description)
        }
    }
}

/// Queue of live toasts, newest last.
#[derive(Debug, Clone)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    lifetime: Duration,
}

impl ToastQueue {
    /// Most toasts kept at once; older ones are dropped first.
    const LIMIT: usize = 5;

    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: VecDeque::new(),
            lifetime,
        }
    }

    pub fn push(&mut self, toast: Toast) {
        match toast.kind {
            ToastKind::Success => tracing::info!(title = %toast.title, "{}", toast.description),
            ToastKind::Error => tracing::warn!(title = %toast.title, "{}", toast.description),
        }
        self.toasts.push_back(toast);
        while self.toasts.len() > Self::LIMIT {
            self.toasts.pop_front();
        }
    }

    /// Drop toasts older than the lifetime.
    pub fn expire(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.created_at) < lifetime);
    }

    /// Newest live toast.
    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_line() {
        let toast = Toast::success("Snippet created", "Your snippet has been saved successfully.");
        assert_eq!(
            toast.line(),
            "Snippet created: Your snippet has been saved successfully."
        );
        assert!(!toast.is_error());
        assert_eq!(Toast::error("Oops", "").line(), "Oops");
    }

    #[test]
    fn test_queue_latest_and_limit() {
        let mut queue = ToastQueue::new(Duration::from_secs(4));
        for i in 0..7 {
            queue.push(Toast::success(&format!("t{}", i), ""));
        }
        assert_eq!(queue.toasts.len(), ToastQueue::LIMIT);
        assert_eq!(queue.latest().unwrap().title, "t6");
        assert_eq!(queue.toasts.front().unwrap().title, "t2");
    }

    #[test]
    fn test_queue_expire() {
        let mut queue = ToastQueue::new(Duration::from_secs(4));
        queue.push(Toast::error("Error deleting snippet", "boom"));
        queue.expire(Instant::now());
        assert_eq!(queue.toasts.len(), 1);

        queue.expire(Instant::now() + Duration::from_secs(5));
        assert!(queue.toasts.is_empty());
    }
}
