//! Page text-selection capability consumed by the widget.
use std::sync::{Arc, Mutex};

use widget_logging::widget_trace;

pub type SubscriptionId = u64;

/// Receives the current trimmed selection, or `None` when nothing is selected.
pub type SelectionListener = Arc<dyn Fn(Option<String>) + Send + Sync>;

pub trait SelectionSource: Send + Sync {
    /// Current trimmed, non-empty selection.
    fn current(&self) -> Option<String>;
    fn subscribe(&self, listener: SelectionListener) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

#[derive(Default)]
struct Inner {
    text: String,
    next_id: SubscriptionId,
    listeners: Vec<(SubscriptionId, SelectionListener)>,
}

/// Selection held in memory and changed programmatically.
///
/// The terminal shell drives it from `/select` commands; tests use it as a
/// deterministic stand-in for a real page.
#[derive(Clone, Default)]
pub struct SharedSelection {
    inner: Arc<Mutex<Inner>>,
}

impl SharedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, text: impl Into<String>) {
        self.replace(text.into());
    }

    pub fn clear(&self) {
        self.replace(String::new());
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.listeners.len()).unwrap_or(0)
    }

    fn replace(&self, text: String) {
        let (current, listeners) = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            inner.text = text;
            let listeners: Vec<SelectionListener> = inner
                .listeners
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            (trimmed(&inner.text), listeners)
        };
        widget_trace!("selection changed, notifying {} listener(s)", listeners.len());
        // Listeners run outside the lock so they may query the source.
        for listener in listeners {
            listener(current.clone());
        }
    }
}

impl SelectionSource for SharedSelection {
    fn current(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|inner| trimmed(&inner.text))
    }

    fn subscribe(&self, listener: SelectionListener) -> SubscriptionId {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.listeners.retain(|(existing, _)| *existing != id);
        }
    }
}

fn trimmed(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
