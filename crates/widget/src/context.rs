//! Host globals as an explicit, observable context object.
//!
//! The host pushes partial patches; widgets read the current snapshot and
//! subscribe to individual keys. A subscription only wakes when a pushed
//! patch actually carried its key.

use std::collections::HashMap;
use std::sync::Arc;

use skydeck_types::{GlobalKey, HostGlobals, HostGlobalsPatch};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct ContextState {
    globals: HostGlobals,
    revisions: HashMap<GlobalKey, u64>,
}

impl ContextState {
    fn revision(&self, key: GlobalKey) -> u64 {
        self.revisions.get(&key).copied().unwrap_or(0)
    }
}

/// Shared handle to one widget session's host globals.
#[derive(Debug, Clone)]
pub struct HostContext {
    sender: Arc<watch::Sender<ContextState>>,
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new(HostGlobals::default())
    }
}

impl HostContext {
    pub fn new(initial: HostGlobals) -> Self {
        let (sender, _receiver) = watch::channel(ContextState {
            globals: initial,
            revisions: HashMap::new(),
        });
        Self { sender: Arc::new(sender) }
    }

    /// Clone of the current snapshot.
    pub fn snapshot(&self) -> HostGlobals {
        self.sender.borrow().globals.clone()
    }

    /// Read from the current snapshot without cloning it.
    pub fn read<T>(&self, reader: impl FnOnce(&HostGlobals) -> T) -> T {
        reader(&self.sender.borrow().globals)
    }

    /// Apply a host-pushed patch and notify subscribers of the keys it carried.
    pub fn push(&self, patch: HostGlobalsPatch) -> Vec<GlobalKey> {
        if patch.is_empty() {
            return Vec::new();
        }
        let mut applied = Vec::new();
        self.sender.send_modify(|state| {
            applied = state.globals.apply(patch);
            for key in &applied {
                *state.revisions.entry(*key).or_default() += 1;
            }
        });
        debug!(keys = ?applied, "host globals updated");
        applied
    }

    /// Subscribe to changes of one key, starting from the current revision.
    pub fn subscribe(&self, key: GlobalKey) -> GlobalSubscription {
        let receiver = self.sender.subscribe();
        let seen = receiver.borrow().revision(key);
        GlobalSubscription { receiver, key, seen }
    }
}

/// Change feed for a single host global.
#[derive(Debug)]
pub struct GlobalSubscription {
    receiver: watch::Receiver<ContextState>,
    key: GlobalKey,
    seen: u64,
}

impl GlobalSubscription {
    pub fn key(&self) -> GlobalKey {
        self.key
    }

    /// Whether the key was pushed since the last observed change.
    pub fn has_changed(&self) -> bool {
        self.receiver.borrow().revision(self.key) != self.seen
    }

    /// Wait until a patch carrying this key arrives and return the snapshot
    /// that followed it. Returns `None` once the host context is gone.
    pub async fn changed(&mut self) -> Option<HostGlobals> {
        loop {
            {
                let state = self.receiver.borrow_and_update();
                let revision = state.revision(self.key);
                if revision != self.seen {
                    self.seen = revision;
                    return Some(state.globals.clone());
                }
            }
            if self.receiver.changed().await.is_err() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skydeck_types::{DisplayMode, Theme};

    #[tokio::test]
    async fn subscriber_wakes_only_for_its_key() {
        let context = HostContext::default();
        let mut display_mode = context.subscribe(GlobalKey::DisplayMode);

        context.push(HostGlobalsPatch {
            theme: Some(Theme::Dark),
            ..HostGlobalsPatch::default()
        });
        assert!(!display_mode.has_changed());

        context.push(HostGlobalsPatch {
            display_mode: Some(DisplayMode::Fullscreen),
            ..HostGlobalsPatch::default()
        });
        assert!(display_mode.has_changed());

        let globals = display_mode.changed().await.expect("context alive");
        assert_eq!(globals.display_mode, DisplayMode::Fullscreen);
        assert_eq!(globals.theme, Theme::Dark);
        assert!(!display_mode.has_changed());
    }

    #[tokio::test]
    async fn coalesced_pushes_still_wake_the_subscriber() {
        let context = HostContext::default();
        let mut widget_state = context.subscribe(GlobalKey::WidgetState);

        context.push(HostGlobalsPatch {
            widget_state: Some(serde_json::json!({ "foo": 1 })),
            ..HostGlobalsPatch::default()
        });
        context.push(HostGlobalsPatch {
            locale: Some("fr-FR".into()),
            ..HostGlobalsPatch::default()
        });

        let globals = widget_state.changed().await.expect("context alive");
        assert_eq!(globals.widget_state, Some(serde_json::json!({ "foo": 1 })));
        assert_eq!(globals.locale, "fr-FR");
    }

    #[tokio::test]
    async fn subscription_ends_when_context_is_dropped() {
        let context = HostContext::default();
        let mut theme = context.subscribe(GlobalKey::Theme);
        drop(context);
        assert!(theme.changed().await.is_none());
    }

    #[test]
    fn empty_patch_is_ignored() {
        let context = HostContext::default();
        let subscription = context.subscribe(GlobalKey::Theme);
        assert!(context.push(HostGlobalsPatch::default()).is_empty());
        assert!(!subscription.has_changed());
    }
}
