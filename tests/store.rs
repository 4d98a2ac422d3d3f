// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::collections::BTreeSet;
use std::path::{
    Path,
    PathBuf,
};

use tempfile::{
    Builder,
    TempDir,
};

use kabinet::{
    CodecKind,
    EngineKind,
    Store,
    StoreError,
    StoreOptions,
    UpdateArgs,
    UpdateSource,
    Value,
    Yield,
};

const ENGINES: [EngineKind; 4] = [EngineKind::Tree, EngineKind::Hash, EngineKind::Dir, EngineKind::Forest];

fn store_path(root: &Path, kind: EngineKind) -> PathBuf {
    root.join(match kind {
        EngineKind::Tree => "store.kvt",
        EngineKind::Hash => "store.kvh",
        EngineKind::Dir => "store.kvd",
        EngineKind::Forest => "store.kvf",
        EngineKind::Poly => "store.kvt",
    })
}

fn open(root: &TempDir, kind: EngineKind) -> Store {
    Store::open(StoreOptions::new(store_path(root.path(), kind)).engine(kind)).expect("opened")
}

fn sorted(values: Vec<Value>) -> BTreeSet<Value> {
    values.into_iter().collect()
}

#[test]
fn test_round_trip() {
    for kind in ENGINES.iter() {
        let root = Builder::new().prefix("test_round_trip").tempdir().expect("tempdir");
        let mut store = open(&root, *kind);

        let entries = vec![
            (Value::from("string"), Value::from("héllo, yöu")),
            (Value::Int(-1), Value::Float(1234.5.into())),
            (Value::from(""), Value::from(b"")),
            (Value::from(b"\x00\x00"), Value::from(b"\x00")),
            (Value::from(("compound", 1)), Value::List(vec![Value::Nil, Value::Bool(false)])),
            (Value::from("x".repeat(200)), Value::Int(1)),
            (Value::from(vec![0xffu8; 4096]), Value::from("long blob key")),
        ];
        for (k, v) in &entries {
            store.set(k, v).expect("set");
        }
        for (k, v) in &entries {
            assert_eq!(&store.get(k).expect("get"), v, "{} engine", kind);
            assert!(store.contains(k).expect("contains"));
        }
        assert_eq!(store.len().expect("len"), entries.len());

        store.set("string", "overwritten").expect("overwritten");
        assert_eq!(store.get("string").expect("get"), Value::from("overwritten"));
        assert_eq!(store.len().expect("len"), entries.len());
    }
}

#[test]
fn test_delete_and_pop() {
    for kind in ENGINES.iter() {
        let root = Builder::new().prefix("test_delete_and_pop").tempdir().expect("tempdir");
        let mut store = open(&root, *kind);
        store.set("a", 1).expect("set");
        store.set("b", 2).expect("set");

        assert!(store.delete("a").expect("deleted"));
        assert!(!store.delete("a").expect("deleted"));
        assert!(!store.contains("a").expect("contains"));
        match store.get("a") {
            Err(StoreError::KeyNotFound(key)) => assert_eq!(key, Value::from("a")),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(store.pop("b").expect("popped"), Value::Int(2));
        assert!(store.pop("b").expect_err("missing").is_not_found());
        assert_eq!(store.pop_or("b", Value::Nil).expect("default"), Value::Nil);
        assert!(store.is_empty().expect("empty"));
    }
}

#[test]
fn test_clear() {
    for kind in ENGINES.iter() {
        let root = Builder::new().prefix("test_clear").tempdir().expect("tempdir");
        let mut store = open(&root, *kind);
        for i in 0..100 {
            store.set(i, i * 2).expect("set");
        }
        store.clear().expect("cleared");
        assert_eq!(store.len().expect("len"), 0);
        assert_eq!(store.iter().expect("cursor").count(), 0);
        store.clear().expect("cleared again");
    }
}

#[test]
fn test_enumeration_agrees_with_len() {
    for kind in ENGINES.iter() {
        let root = Builder::new().prefix("test_enumeration").tempdir().expect("tempdir");
        let mut store = open(&root, *kind);
        for i in 0..50 {
            store.set(i, format!("value {}", i)).expect("set");
        }

        let len = store.len().expect("len");
        assert_eq!(store.iter_keys().expect("cursor").count(), len);
        assert_eq!(store.iter_values().expect("cursor").count(), len);
        assert_eq!(store.iter_items().expect("cursor").count(), len);

        let keys = store.keys().expect("keys");
        let values = store.values().expect("values");
        let items = store.items().expect("items");
        assert_eq!(keys.len(), len);
        assert_eq!(sorted(keys.clone()), (0..50).map(Value::from).collect());
        assert_eq!(sorted(values), (0..50).map(|i| Value::from(format!("value {}", i))).collect());

        // The bulk enumerators and cursors walk the engine in the same order.
        let cursor_keys: Vec<Value> = store.iter().expect("cursor").map(|y| y.expect("key").into_value()).collect();
        assert_eq!(cursor_keys, keys);
        for (key, (item_key, item_value)) in keys.iter().zip(items.iter()) {
            assert_eq!(key, item_key);
            assert_eq!(&store.get(key).expect("get"), item_value);
        }
    }
}

#[test]
fn test_ordered_engines_iterate_in_key_order() {
    for kind in ENGINES.iter().filter(|kind| kind.is_ordered()) {
        let root = Builder::new().prefix("test_ordered").tempdir().expect("tempdir");
        let mut store = Store::open(
            StoreOptions::new(store_path(root.path(), *kind)).engine(*kind).codec(CodecKind::Raw),
        )
        .expect("opened");
        for key in &[&b"c"[..], b"a", b"b\x00", b"b"] {
            store.set(*key, b"v").expect("set");
        }
        let keys: Vec<Value> = store.keys().expect("keys");
        assert_eq!(keys, vec![Value::from(b"a"), Value::from(b"b"), Value::from(b"b\x00"), Value::from(b"c")]);
    }
}

#[test]
fn test_persistence() {
    for kind in ENGINES.iter() {
        let root = Builder::new().prefix("test_persistence").tempdir().expect("tempdir");
        {
            let mut store = open(&root, *kind);
            store.set("kept", 1).expect("set");
            store.set("dropped", 2).expect("set");
            store.delete("dropped").expect("deleted");
            store.close().expect("closed");
        }
        {
            // Dropping the handle closes the store, too.
            let mut store = open(&root, *kind);
            store.set("implicit", true).expect("set");
        }

        let store = Store::open(StoreOptions::new(store_path(root.path(), *kind)).engine(*kind).read_only())
            .expect("reopened");
        assert_eq!(store.len().expect("len"), 2);
        assert_eq!(store.get("kept").expect("get"), Value::Int(1));
        assert_eq!(store.get("implicit").expect("get"), Value::Bool(true));
        assert!(!store.contains("dropped").expect("contains"));
    }
}

#[test]
fn test_update_every_engine() {
    for kind in ENGINES.iter() {
        let root = Builder::new().prefix("test_update").tempdir().expect("tempdir");
        let mut store = open(&root, *kind);
        let pairs = vec![Value::from(("a", 1)), Value::from(("b", 2)), Value::Int(3), Value::from(("c", 4))];
        match store.update(UpdateArgs::new().source(UpdateSource::pairs(pairs))) {
            Err(StoreError::ArgumentError(msg)) => {
                assert_eq!(msg, "cannot convert update sequence element #2 to a sequence")
            },
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sorted(store.keys().expect("keys")), vec![Value::from("a"), Value::from("b")].into_iter().collect());

        store.update(UpdateArgs::new().named("c", 5).named("a", 0)).expect("updated");
        assert_eq!(store.get("a").expect("get"), Value::Int(0));
        assert_eq!(store.get("c").expect("get"), Value::Int(5));
    }
}

#[test]
fn test_closed_store_and_cursor() {
    for kind in ENGINES.iter() {
        let root = Builder::new().prefix("test_closed").tempdir().expect("tempdir");
        let mut store = open(&root, *kind);
        store.set("a", 1).expect("set");
        store.set("b", 2).expect("set");

        let mut cursor = store.iter_items().expect("cursor");
        match cursor.next() {
            Some(Ok(Yield::Pair(..))) => (),
            other => panic!("unexpected {:?}", other),
        }
        store.close().expect("closed");

        assert!(matches!(cursor.next(), Some(Err(StoreError::ClosedError))));
        assert!(matches!(store.get("a"), Err(StoreError::ClosedError)));
        assert!(matches!(store.set("c", 3), Err(StoreError::ClosedError)));
        assert!(matches!(store.delete("a"), Err(StoreError::ClosedError)));
        assert!(matches!(store.contains("a"), Err(StoreError::ClosedError)));
        assert!(matches!(store.len(), Err(StoreError::ClosedError)));
        assert!(matches!(store.pop("a"), Err(StoreError::ClosedError)));
        assert!(matches!(store.keys(), Err(StoreError::ClosedError)));
        assert!(matches!(store.update(UpdateArgs::new().named("x", 1)), Err(StoreError::ClosedError)));
    }
}

#[test]
fn test_mutation_during_iteration() {
    let mut store = Store::open(StoreOptions::in_memory()).expect("opened");
    for i in 0..10 {
        store.set(i, i).expect("set");
    }
    let mut seen = 0;
    for key in store.iter_keys().expect("cursor") {
        let key = key.expect("key").into_value();
        store.delete(key).expect("deleted");
        seen += 1;
    }
    assert_eq!(seen, 10);
    assert!(store.is_empty().expect("empty"));
}

#[test]
fn test_example_scenario() {
    let mut store = Store::open(StoreOptions::new("*")).expect("opened");
    assert_eq!(store.engine_kind().expect("kind"), EngineKind::Hash);
    store.set("a", "1").expect("set");
    store.set("b", "2").expect("set");
    assert_eq!(store.len().expect("len"), 2);
    assert_eq!(store.pop("a").expect("popped"), Value::from("1"));
    assert_eq!(store.len().expect("len"), 1);
    assert!(!store.contains("a").expect("contains"));
    assert_eq!(store.items().expect("items"), vec![(Value::from("b"), Value::from("2"))]);
}
