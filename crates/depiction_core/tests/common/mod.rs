#![allow(dead_code)]

use depiction_core::db::open_db_in_memory;
use depiction_core::{
    AddressRouter, ChangeNotifier, DepictionProvider, DepictionStore, FieldValues, ProviderConfig,
};
use std::sync::{Arc, Mutex};

pub const AUTHORITY: &str = "test.depictions";

/// Notifier that remembers every address it was given.
#[derive(Default)]
pub struct RecordingNotifier {
    addresses: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn addresses(&self) -> Vec<String> {
        self.addresses.lock().unwrap().clone()
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn notify_change(&self, address: &str) {
        self.addresses.lock().unwrap().push(address.to_string());
    }
}

pub fn provider() -> DepictionProvider<Arc<RecordingNotifier>> {
    DepictionProvider::new(
        AddressRouter::new(&ProviderConfig::new(AUTHORITY).unwrap()),
        DepictionStore::new(open_db_in_memory().unwrap()),
        Arc::new(RecordingNotifier::default()),
    )
}

pub fn depiction(name: &str, description: &str, last_used: i64, times_used: i64) -> FieldValues {
    FieldValues::new()
        .with("name", name.to_string())
        .with("description", description.to_string())
        .with("last_used", last_used)
        .with("times_used", times_used)
}

pub fn row_count<N: ChangeNotifier>(provider: &DepictionProvider<N>) -> usize {
    provider
        .query(
            &provider.router().collection_address(),
            &Default::default(),
        )
        .unwrap()
        .len()
}
