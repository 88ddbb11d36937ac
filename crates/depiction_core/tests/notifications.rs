mod common;

use common::{depiction, provider, AUTHORITY};
use depiction_core::db::open_db_in_memory;
use depiction_core::{
    AddressRouter, ContentObserver, DepictionProvider, DepictionStore, FieldValues,
    ObserverRegistry, ProviderConfig, QueryRequest,
};
use std::sync::{Arc, Mutex, Weak};

#[test]
fn each_mutation_notifies_the_address_it_was_given() {
    let provider = provider();
    let collection = provider.router().collection_address();

    let id = provider
        .insert(&collection, &depiction("a", "", 0, 0))
        .unwrap();
    provider
        .bulk_insert(&collection, &[depiction("b", "", 0, 0)])
        .unwrap();
    let item = provider.router().item_address(id).unwrap();
    provider
        .update(
            &item,
            &FieldValues::new().with("times_used", 1_i64),
            None,
            &[],
        )
        .unwrap();
    provider.query(&collection, &QueryRequest::default()).unwrap();
    provider.delete(&item, None, &[]);

    assert_eq!(
        provider.notifier().addresses(),
        [collection.clone(), collection, item]
    );
}

#[test]
fn failed_mutations_do_not_notify() {
    let provider = provider();
    let collection = provider.router().collection_address();
    let item = provider.router().item_address(1).unwrap();

    let _ = provider.insert(&item, &depiction("a", "", 0, 0));
    let _ = provider.update(&collection, &depiction("a", "", 0, 0), None, &[]);
    let _ = provider.update(&item, &depiction("a", "", 0, 0), Some("1"), &[]);
    let _ = provider.insert(&collection, &FieldValues::new());

    assert!(provider.notifier().addresses().is_empty());
}

struct RequeryObserver {
    provider: Weak<DepictionProvider<Arc<ObserverRegistry>>>,
    seen_rows: Mutex<Vec<usize>>,
}

impl ContentObserver for RequeryObserver {
    fn on_change(&self, _address: &str) {
        if let Some(provider) = self.provider.upgrade() {
            let rows = provider
                .query(
                    &provider.router().collection_address(),
                    &QueryRequest::default(),
                )
                .unwrap();
            self.seen_rows.lock().unwrap().push(rows.len());
        }
    }
}

#[test]
fn observers_can_requery_from_their_callback() {
    let registry = Arc::new(ObserverRegistry::new());
    let provider = Arc::new(DepictionProvider::new(
        AddressRouter::new(&ProviderConfig::new(AUTHORITY).unwrap()),
        DepictionStore::new(open_db_in_memory().unwrap()),
        Arc::clone(&registry),
    ));
    let observer = Arc::new(RequeryObserver {
        provider: Arc::downgrade(&provider),
        seen_rows: Mutex::new(Vec::new()),
    });
    let collection = provider.router().collection_address();
    registry.register(&collection, true, observer.clone());

    let id = provider
        .insert(&collection, &depiction("a", "", 0, 0))
        .unwrap();
    provider
        .update(
            &provider.router().item_address(id).unwrap(),
            &FieldValues::new().with("times_used", 2_i64),
            None,
            &[],
        )
        .unwrap();

    assert_eq!(*observer.seen_rows.lock().unwrap(), [1, 1]);
}

#[test]
fn row_set_carries_the_queried_address() {
    let provider = provider();
    let collection = provider.router().collection_address();
    let id = provider
        .insert(&collection, &depiction("a", "", 0, 0))
        .unwrap();
    let item = provider.router().item_address(id).unwrap();

    let rows = provider.query(&item, &QueryRequest::default()).unwrap();
    assert_eq!(rows.notification_address(), Some(item.as_str()));
}
