//! User-facing notices for API failures and successes.
//!
//! [`Presenter`] classifies errors and hands the resulting message to a
//! [`Notifier`]: either the caller's container (inline, one notice at a time)
//! or the global toast stack. Notices dismiss themselves after
//! [`ERROR_DISMISS_AFTER`] / [`SUCCESS_DISMISS_AFTER`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::api::{ApiError, classify};

pub const ERROR_DISMISS_AFTER: Duration = Duration::from_secs(5);
pub const SUCCESS_DISMISS_AFTER: Duration = Duration::from_secs(3);

static NEXT_NOTICE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Success,
}

impl NoticeKind {
    pub fn dismiss_after(self) -> Duration {
        match self {
            NoticeKind::Error => ERROR_DISMISS_AFTER,
            NoticeKind::Success => SUCCESS_DISMISS_AFTER,
        }
    }
}

/// A rendered, dismissible notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub shown_at: Instant,
}

impl Notice {
    fn new(kind: NoticeKind, message: &str) -> Self {
        Self {
            id: NEXT_NOTICE_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            message: message.to_string(),
            shown_at: Instant::now(),
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.shown_at + self.kind.dismiss_after()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}

/// Somewhere notices can be rendered.
pub trait Notifier: Send + Sync {
    /// Renders a new notice and returns it.
    fn present(&self, kind: NoticeKind, message: &str) -> Notice;

    /// Dismisses a notice early. Returns false if it is no longer shown.
    fn dismiss(&self, id: u64) -> bool;

    /// Notices still on screen; auto-dismissed ones are dropped first.
    fn visible(&self) -> Vec<Notice>;
}

/// Inline notice area scoped to one container (a form, a page section).
///
/// Holds at most one notice: a new one replaces whatever was shown.
#[derive(Debug)]
pub struct ContainerNotifier {
    name: String,
    slot: Mutex<Option<Notice>>,
}

impl ContainerNotifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The notice currently shown, if any.
    pub fn current(&self) -> Option<Notice> {
        self.visible().pop()
    }
}

impl Notifier for ContainerNotifier {
    fn present(&self, kind: NoticeKind, message: &str) -> Notice {
        let notice = Notice::new(kind, message);
        tracing::debug!(container = %self.name, ?kind, "inline notice");
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(notice.clone());
        notice
    }

    fn dismiss(&self, id: u64) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|notice| notice.id == id) {
            *slot = None;
            return true;
        }
        false
    }

    fn visible(&self) -> Vec<Notice> {
        let now = Instant::now();
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|notice| notice.is_expired(now)) {
            *slot = None;
        }
        slot.iter().cloned().collect()
    }
}

type Renderer = Box<dyn Fn(&Notice) + Send + Sync>;

/// Global toast stack. Toasts are removed once dismissed or expired.
pub struct ToastNotifier {
    toasts: Mutex<Vec<Notice>>,
    renderer: Option<Renderer>,
}

impl ToastNotifier {
    pub fn new() -> Self {
        Self {
            toasts: Mutex::new(Vec::new()),
            renderer: None,
        }
    }

    /// Calls `render` once for every toast as it is presented.
    pub fn with_renderer(render: impl Fn(&Notice) + Send + Sync + 'static) -> Self {
        Self {
            toasts: Mutex::new(Vec::new()),
            renderer: Some(Box::new(render)),
        }
    }
}

impl Default for ToastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToastNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastNotifier")
            .field("toasts", &self.toasts)
            .finish_non_exhaustive()
    }
}

impl Notifier for ToastNotifier {
    fn present(&self, kind: NoticeKind, message: &str) -> Notice {
        let notice = Notice::new(kind, message);
        {
            let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
            let now = notice.shown_at;
            toasts.retain(|toast| !toast.is_expired(now));
            toasts.push(notice.clone());
        }
        if let Some(render) = &self.renderer {
            render(&notice);
        }
        notice
    }

    fn dismiss(&self, id: u64) -> bool {
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    }

    fn visible(&self) -> Vec<Notice> {
        let now = Instant::now();
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        toasts.retain(|toast| !toast.is_expired(now));
        toasts.clone()
    }
}

/// Routes classified errors and success messages to notifiers.
#[derive(Clone)]
pub struct Presenter {
    global: Arc<dyn Notifier>,
}

impl Presenter {
    pub fn new(global: Arc<dyn Notifier>) -> Self {
        Self { global }
    }

    /// Shows `raw` to the user, inline in `container` when given, otherwise as
    /// a global toast. Returns the classified error that was shown.
    pub fn show_error_to_user(&self, raw: &ApiError, container: Option<&dyn Notifier>) -> ApiError {
        let classified = classify(raw);
        tracing::debug!(code = %classified.code, status = classified.status, "showing error");
        self.target(container)
            .present(NoticeKind::Error, &classified.message);
        classified
    }

    pub fn show_success_message(&self, message: &str, container: Option<&dyn Notifier>) {
        self.target(container).present(NoticeKind::Success, message);
    }

    pub fn global(&self) -> &dyn Notifier {
        self.global.as_ref()
    }

    fn target<'a>(&'a self, container: Option<&'a dyn Notifier>) -> &'a dyn Notifier {
        container.unwrap_or(self.global.as_ref())
    }
}

impl std::fmt::Debug for Presenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presenter").finish_non_exhaustive()
    }
}
