// Any copyright is dedicated to the Public Domain.
// http://creativecommons.org/publicdomain/zero/1.0/

//! A simple demo that showcases the basic usage (set/get/delete) of a store.
//!
//! You can test this out by running:
//!
//!     cargo run --example simple-store

use std::collections::BTreeMap;

use kabinet::{
    EngineKind,
    Store,
    StoreOptions,
    UpdateArgs,
    UpdateSource,
    Value,
};
use tempfile::Builder;
use uuid::Uuid;

fn main() {
    let root = Builder::new().prefix("simple-db").tempdir().unwrap();
    let path = root.path().join("store");

    // Every record of a dir engine is a file of its own.
    let mut store = Store::open(StoreOptions::new(&path).engine(EngineKind::Dir)).unwrap();

    println!("Inserting data...");
    store.set("int", 1234).unwrap();
    store.set("float", 1234.0).unwrap();
    store.set("boolean", true).unwrap();
    store.set("string", "héllo, yöu").unwrap();
    store.set("uuid", Uuid::new_v4()).unwrap();
    store.set("blob", b"blob").unwrap();
    store.set(("compound", 1), vec![Value::Nil, Value::from("list")]).unwrap();

    println!("Looking up keys...");
    println!("Get int {:?}", store.get("int").unwrap());
    println!("Get float {:?}", store.get("float").unwrap());
    println!("Get boolean {:?}", store.get("boolean").unwrap());
    println!("Get string {:?}", store.get("string").unwrap());
    println!("Get uuid {:?}", store.get("uuid").unwrap());
    println!("Get blob {:?}", store.get("blob").unwrap());
    println!("Get compound {:?}", store.get(("compound", 1)).unwrap());
    println!("Get non-existent {:?}", store.get("non-existent").err());

    println!("Iterating...");
    for item in store.iter_items().unwrap() {
        println!("{:?}", item.unwrap());
    }

    println!("Merging...");
    let mut more = BTreeMap::new();
    more.insert(Value::from("int"), Value::Int(4321));
    store.update(UpdateArgs::new().source(UpdateSource::mapping(&more)).named("named", "value")).unwrap();
    println!("Get int {:?}", store.get("int").unwrap());
    println!("Get named {:?}", store.get("named").unwrap());

    println!("Deleting...");
    store.delete("int").unwrap();
    println!("Popped {:?}", store.pop("string").unwrap());
    println!("Get int {:?}", store.get("int").err());
    println!("Len {:?}", store.len().unwrap());

    println!("Clearing...");
    store.clear().unwrap();
    println!("Len {:?}", store.len().unwrap());

    store.close().unwrap();
}
