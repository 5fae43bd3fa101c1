//! Model-based test: the runtime hashmap agrees with `std` on random
//! operation sequences.

use std::collections::HashMap;

use kiln_rt::Hashmap;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum MapAction {
    Set(u16, u32),
    Delete(u16),
    Get(u16),
}

fn action() -> impl Strategy<Value = MapAction> {
    prop_oneof![
        (0u16..64, any::<u32>()).prop_map(|(k, v)| MapAction::Set(k, v)),
        (0u16..64).prop_map(MapAction::Delete),
        (0u16..64).prop_map(MapAction::Get),
    ]
}

proptest! {
    #[test]
    fn binary_map_matches_model(hint in 0usize..40, actions in proptest::collection::vec(action(), 0..200)) {
        let mut map = Hashmap::make(2, 4, hint);
        let mut model: HashMap<u16, u32> = HashMap::new();

        for act in actions {
            match act {
                MapAction::Set(k, v) => {
                    map.binary_set(&k.to_le_bytes(), &v.to_le_bytes());
                    model.insert(k, v);
                }
                MapAction::Delete(k) => {
                    map.binary_delete(&k.to_le_bytes());
                    model.remove(&k);
                }
                MapAction::Get(k) => {
                    let mut out = [0xff; 4];
                    let found = map.binary_get(&k.to_le_bytes(), &mut out);
                    prop_assert_eq!(found, model.contains_key(&k));
                    prop_assert_eq!(u32::from_le_bytes(out), model.get(&k).copied().unwrap_or(0));
                }
            }
            prop_assert_eq!(map.len(), model.len());
        }
    }

    #[test]
    fn string_map_matches_model(keys in proptest::collection::vec("[a-z]{0,6}", 0..60)) {
        let mut map = Hashmap::make(16, 8, 0);
        let mut model: HashMap<String, u64> = HashMap::new();

        for (i, key) in keys.iter().enumerate() {
            map.string_set(key.as_bytes(), &(i as u64).to_le_bytes());
            model.insert(key.clone(), i as u64);
        }
        prop_assert_eq!(map.len(), model.len());
        for (key, value) in &model {
            let mut out = [0; 8];
            prop_assert!(map.string_get(key.as_bytes(), &mut out));
            prop_assert_eq!(u64::from_le_bytes(out), *value);
        }
    }
}
