mod common;

use common::{depiction, provider, row_count};
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_bulk_inserts_are_serialized_by_the_store() {
    let provider = Arc::new(provider());
    let collection = provider.router().collection_address();

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let provider = Arc::clone(&provider);
            let collection = collection.clone();
            thread::spawn(move || {
                let rows: Vec<_> = (0..25)
                    .map(|index| depiction(&format!("w{worker}-{index}"), "", index, 0))
                    .collect();
                provider.bulk_insert(&collection, &rows).unwrap()
            })
        })
        .collect();

    let inserted: usize = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .sum();
    assert_eq!(inserted, 100);
    assert_eq!(row_count(&provider), 100);
    assert_eq!(provider.notifier().addresses().len(), 4);
}
