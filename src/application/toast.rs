//! Transient notifications shown in the corner of admin pages.

use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::task::AbortHandle;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(4000);
pub const DEFAULT_EXIT_ANIMATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub const ALL: [ToastKind; 4] = [
        ToastKind::Success,
        ToastKind::Error,
        ToastKind::Warning,
        ToastKind::Info,
    ];

    pub fn as_variant(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ToastKind::Success => "fa-check-circle",
            ToastKind::Error => "fa-exclamation-circle",
            ToastKind::Warning => "fa-exclamation-triangle",
            ToastKind::Info => "fa-info-circle",
        }
    }

    pub fn default_ttl(self) -> Duration {
        match self {
            ToastKind::Success | ToastKind::Info => Duration::from_millis(3000),
            ToastKind::Error | ToastKind::Warning => DEFAULT_TOAST_TTL,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        ToastKind::ALL
            .into_iter()
            .find(|kind| kind.as_variant().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub text: String,
    /// Zero keeps the toast until it is dismissed.
    pub ttl: Duration,
}

impl Toast {
    pub fn new(kind: ToastKind, text: impl Into<String>) -> Self {
        Self::with_ttl(kind, text, kind.default_ttl())
    }

    pub fn with_ttl(kind: ToastKind, text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            ttl,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, text)
    }
}

/// One-shot message the server left on the page for the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub kind: ToastKind,
    pub text: String,
}

/// Per-kind lifetimes plus the exit animation that runs before removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTimings {
    pub success: Duration,
    pub info: Duration,
    pub warning: Duration,
    pub error: Duration,
    pub exit_animation: Duration,
}

impl Default for ToastTimings {
    fn default() -> Self {
        Self {
            success: ToastKind::Success.default_ttl(),
            info: ToastKind::Info.default_ttl(),
            warning: ToastKind::Warning.default_ttl(),
            error: ToastKind::Error.default_ttl(),
            exit_animation: DEFAULT_EXIT_ANIMATION,
        }
    }
}

impl ToastTimings {
    pub fn ttl_for(&self, kind: ToastKind) -> Duration {
        match kind {
            ToastKind::Success => self.success,
            ToastKind::Info => self.info,
            ToastKind::Warning => self.warning,
            ToastKind::Error => self.error,
        }
    }
}

/// Toast as currently displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveToast {
    pub toast: Toast,
    /// The exit animation is running.
    pub leaving: bool,
}

struct Entry {
    sequence: u64,
    toast: Toast,
    leaving: bool,
    timer: Option<AbortHandle>,
}

struct Stack {
    entries: DashMap<Uuid, Entry>,
    sequence: AtomicU64,
    timings: ToastTimings,
}

/// Shared toast stack. Cloning yields another handle to the same stack.
///
/// Timers run on the ambient tokio runtime, so `show` must be called from
/// within one.
#[derive(Clone)]
pub struct ToastCenter {
    stack: Arc<Stack>,
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(ToastTimings::default())
    }
}

impl ToastCenter {
    pub fn new(timings: ToastTimings) -> Self {
        Self {
            stack: Arc::new(Stack {
                entries: DashMap::new(),
                sequence: AtomicU64::new(0),
                timings,
            }),
        }
    }

    pub fn timings(&self) -> ToastTimings {
        self.stack.timings
    }

    /// Show `text` with the configured lifetime for `kind`.
    pub fn notify(&self, kind: ToastKind, text: impl Into<String>) -> Uuid {
        let ttl = self.stack.timings.ttl_for(kind);
        self.show(Toast::with_ttl(kind, text, ttl))
    }

    /// Append `toast` to the stack and arm its removal timer.
    pub fn show(&self, toast: Toast) -> Uuid {
        let id = toast.id;
        let ttl = toast.ttl;
        counter!("docdesk_toast_shown_total", "kind" => toast.kind.as_variant()).increment(1);
        debug!(
            target = "docdesk::application::toast",
            toast_id = %id,
            kind = toast.kind.as_variant(),
            ttl_ms = ttl.as_millis() as u64,
            "toast shown"
        );

        let sequence = self.stack.sequence.fetch_add(1, Ordering::Relaxed);
        // The vacant slot holds its shard lock until the entry lands with its timer.
        let slot = self.stack.entries.entry(id);
        let timer = (!ttl.is_zero()).then(|| {
            let stack = Arc::downgrade(&self.stack);
            let exit = self.stack.timings.exit_animation;
            tokio::spawn(expire(stack, id, ttl, exit)).abort_handle()
        });
        slot.insert(Entry {
            sequence,
            toast,
            leaving: false,
            timer,
        });
        id
    }

    pub fn show_flashes(&self, flashes: Vec<FlashMessage>) -> Vec<Uuid> {
        flashes
            .into_iter()
            .map(|flash| self.notify(flash.kind, flash.text))
            .collect()
    }

    /// Remove a toast now, cancelling its timer. Returns `false` when it was
    /// already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let Some((_, entry)) = self.stack.entries.remove(&id) else {
            return false;
        };
        if let Some(timer) = entry.timer {
            timer.abort();
        }
        counter!("docdesk_toast_dismissed_total", "kind" => entry.toast.kind.as_variant())
            .increment(1);
        true
    }

    pub fn clear(&self) {
        let ids: Vec<Uuid> = self.stack.entries.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            self.dismiss(id);
        }
    }

    pub fn len(&self) -> usize {
        self.stack.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.entries.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.stack.entries.contains_key(&id)
    }

    /// Displayed toasts, oldest first.
    pub fn snapshot(&self) -> Vec<ActiveToast> {
        let mut entries: Vec<(u64, ActiveToast)> = self
            .stack
            .entries
            .iter()
            .map(|entry| {
                (
                    entry.sequence,
                    ActiveToast {
                        toast: entry.toast.clone(),
                        leaving: entry.leaving,
                    },
                )
            })
            .collect();
        entries.sort_by_key(|(sequence, _)| *sequence);
        entries.into_iter().map(|(_, toast)| toast).collect()
    }
}

async fn expire(stack: Weak<Stack>, id: Uuid, ttl: Duration, exit: Duration) {
    tokio::time::sleep(ttl).await;
    match stack.upgrade() {
        Some(stack) => {
            if let Some(mut entry) = stack.entries.get_mut(&id) {
                entry.leaving = true;
            }
        }
        None => return,
    }

    tokio::time::sleep(exit).await;
    if let Some(stack) = stack.upgrade() {
        stack.entries.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_defaults_follow_severity() {
        assert_eq!(Toast::success("ok").ttl, Duration::from_millis(3000));
        assert_eq!(Toast::info("fyi").ttl, Duration::from_millis(3000));
        assert_eq!(Toast::warning("hm").ttl, Duration::from_millis(4000));
        assert_eq!(Toast::error("no").ttl, Duration::from_millis(4000));
    }

    #[test]
    fn parses_flash_kinds() {
        assert_eq!(ToastKind::parse("Success"), Some(ToastKind::Success));
        assert_eq!(ToastKind::parse("danger"), None);
    }

    #[tokio::test]
    async fn dismiss_removes_immediately() {
        let center = ToastCenter::default();
        let first = center.show(Toast::success("Đã lưu"));
        let second = center.show(Toast::error("Lỗi"));

        assert!(center.dismiss(first));
        assert!(!center.dismiss(first));

        let remaining = center.snapshot();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].toast.id, second);
    }

    #[tokio::test]
    async fn snapshot_keeps_display_order() {
        let center = ToastCenter::default();
        let texts = ["một", "hai", "ba"];
        for text in texts {
            center.show(Toast::info(text));
        }

        let shown: Vec<String> = center
            .snapshot()
            .into_iter()
            .map(|active| active.toast.text)
            .collect();
        assert_eq!(shown, texts);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn timed_toasts_are_stored_with_their_timer() {
        let center = ToastCenter::new(ToastTimings {
            exit_animation: Duration::ZERO,
            ..ToastTimings::default()
        });
        let id = center.show(Toast::with_ttl(ToastKind::Info, "nhanh", Duration::from_nanos(1)));
        let armed = center
            .stack
            .entries
            .get(&id)
            .map(|entry| entry.timer.is_some());
        assert!(matches!(armed, Some(true) | None));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!center.contains(id));

        let held = center.show(Toast::with_ttl(ToastKind::Info, "giữ", Duration::from_secs(60)));
        assert_eq!(
            center.stack.entries.get(&held).map(|entry| entry.timer.is_some()),
            Some(true)
        );
        assert!(center.dismiss(held));
    }

    #[tokio::test]
    async fn zero_ttl_toasts_stay_until_dismissed() {
        let center = ToastCenter::default();
        let id = center.show(Toast::with_ttl(ToastKind::Warning, "giữ", Duration::ZERO));
        assert!(center.contains(id));
        center.clear();
        assert!(center.is_empty());
    }
}
