//! Property-based tests for the binding store.

use keygate_activation::{BindingStore, Bindings};
use proptest::prelude::*;

fn bindings_strategy() -> impl Strategy<Value = Bindings> {
    prop::collection::btree_map(any::<String>(), any::<String>(), 0..50)
}

proptest! {
    /// Saving what was loaded leaves the contents unchanged.
    #[test]
    fn save_of_load_is_lossless(bindings in bindings_strategy()) {
        let dir = tempfile::tempdir().unwrap();
        let store = BindingStore::new(dir.path().join("keys.json"));

        store.save(&bindings).unwrap();
        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();

        prop_assert_eq!(store.load().unwrap(), bindings);
    }
}
