//! Change notification hooks.
//!
//! # Responsibility
//! - Define the notifier seam the provider calls after each mutation.
//! - Provide an in-process observer registry for hosts without their own
//!   delivery mechanism.
//!
//! # Invariants
//! - `notify_change` never fails and never panics on a poisoned lock.
//! - Observers are called without any registry lock held, in registration order.

use log::debug;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives "data at this address may have changed" signals.
pub trait ChangeNotifier: Send + Sync {
    fn notify_change(&self, address: &str);
}

impl<T: ChangeNotifier + ?Sized> ChangeNotifier for Arc<T> {
    fn notify_change(&self, address: &str) {
        (**self).notify_change(address);
    }
}

/// Notifier that drops every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify_change(&self, _address: &str) {}
}

/// Callback registered with an [`ObserverRegistry`].
pub trait ContentObserver: Send + Sync {
    fn on_change(&self, address: &str);
}

/// Handle returned by [`ObserverRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

struct ObserverEntry {
    id: ObserverId,
    address: String,
    notify_for_descendants: bool,
    observer: Arc<dyn ContentObserver>,
}

#[derive(Default)]
struct ObserverTable {
    next_id: u64,
    entries: Vec<ObserverEntry>,
}

/// In-process observer registry keyed by address.
///
/// A change on address `A` reaches observers registered on `A`, on any
/// address below `A`, and on any address above `A` that asked for
/// descendants.
#[derive(Default)]
pub struct ObserverRegistry {
    table: Mutex<ObserverTable>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        address: &str,
        notify_for_descendants: bool,
        observer: Arc<dyn ContentObserver>,
    ) -> ObserverId {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table.next_id += 1;
        let id = ObserverId(table.next_id);
        table.entries.push(ObserverEntry {
            id,
            address: normalize_address(address).to_string(),
            notify_for_descendants,
            observer,
        });
        id
    }

    /// Removes one observer. Returns `false` when `id` was not registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let before = table.entries.len();
        table.entries.retain(|entry| entry.id != id);
        table.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChangeNotifier for ObserverRegistry {
    fn notify_change(&self, address: &str) {
        let changed = normalize_address(address);
        let targets: Vec<Arc<dyn ContentObserver>> = {
            let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table
                .entries
                .iter()
                .filter(|entry| {
                    entry.address == changed
                        || is_descendant(&entry.address, changed)
                        || (entry.notify_for_descendants && is_descendant(changed, &entry.address))
                })
                .map(|entry| Arc::clone(&entry.observer))
                .collect()
        };

        debug!(
            "event=change_notify module=notify status=ok observers={}",
            targets.len()
        );
        for observer in targets {
            observer.on_change(address);
        }
    }
}

fn normalize_address(address: &str) -> &str {
    let end = address.find(['?', '#']).unwrap_or(address.len());
    address[..end].trim_end_matches('/')
}

/// Whether `child` is strictly below `parent` in the path hierarchy.
fn is_descendant(child: &str, parent: &str) -> bool {
    child.len() > parent.len()
        && child.starts_with(parent)
        && child.as_bytes()[parent.len()] == b'/'
}

#[cfg(test)]
mod tests {
    use super::{is_descendant, normalize_address, ChangeNotifier, ContentObserver, ObserverRegistry};
    use std::sync::{Arc, Mutex};

    const COLLECTION: &str = "content://test/depictions";
    const ITEM: &str = "content://test/depictions/4";

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl ContentObserver for Recorder {
        fn on_change(&self, address: &str) {
            self.seen.lock().unwrap().push(address.to_string());
        }
    }

    impl Recorder {
        fn count(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[test]
    fn exact_and_descendant_matching() {
        let registry = ObserverRegistry::new();
        let collection_only = Arc::new(Recorder::default());
        let collection_tree = Arc::new(Recorder::default());
        let item = Arc::new(Recorder::default());
        registry.register(COLLECTION, false, collection_only.clone());
        registry.register(COLLECTION, true, collection_tree.clone());
        registry.register(ITEM, false, item.clone());

        registry.notify_change(ITEM);
        assert_eq!(collection_only.count(), 0);
        assert_eq!(collection_tree.count(), 1);
        assert_eq!(item.count(), 1);

        registry.notify_change(COLLECTION);
        assert_eq!(collection_only.count(), 1);
        assert_eq!(collection_tree.count(), 2);
        assert_eq!(item.count(), 2);

        registry.notify_change("content://test/depictions/40");
        assert_eq!(item.count(), 2);
    }

    #[test]
    fn unregister_stops_delivery() {
        let registry = ObserverRegistry::new();
        let recorder = Arc::new(Recorder::default());
        let id = registry.register(COLLECTION, true, recorder.clone());
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.is_empty());

        registry.notify_change(COLLECTION);
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn address_helpers() {
        assert_eq!(normalize_address("content://a/b/?x=1"), "content://a/b");
        assert!(is_descendant("content://a/b/1", "content://a/b"));
        assert!(!is_descendant("content://a/bc", "content://a/b"));
        assert!(!is_descendant("content://a/b", "content://a/b"));
    }
}
