// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::fs;

use tempfile::Builder;

use kabinet::backend::ErrorImpl;
use kabinet::{
    Codec,
    CodecKind,
    DataError,
    EngineKind,
    ObjectCodec,
    OpenFlags,
    RawCodec,
    Store,
    StoreError,
    StoreOptions,
    Value,
};

#[test]
fn test_unsupported_engine_name() {
    match "btreedb".parse::<EngineKind>() {
        Err(StoreError::UnsupportedEngineError(name)) => assert_eq!(name, "btreedb"),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!("TreeDB".parse::<EngineKind>().expect("parsed"), EngineKind::Tree);
}

#[test]
fn test_open_missing_read_only() {
    let root = Builder::new().prefix("test_open_missing").tempdir().expect("tempdir");
    let path = root.path().join("missing.kvt");
    match Store::open(StoreOptions::new(&path).read_only()) {
        Err(StoreError::OpenError {
            path: failed,
            cause: ErrorImpl::NotFound(_),
        }) => assert_eq!(failed, path),
        other => panic!("unexpected {:?}", other),
    }
    assert!(!path.exists());
}

#[test]
fn test_open_unsuitable_path() {
    let root = Builder::new().prefix("test_open_unsuitable").tempdir().expect("tempdir");
    match Store::open(StoreOptions::new(root.path().join("store.txt"))) {
        Err(StoreError::OpenError {
            cause: ErrorImpl::UnsuitablePath(_),
            ..
        }) => (),
        other => panic!("unexpected {:?}", other),
    }

    // A file where a directory engine expects a directory.
    let file = root.path().join("file.kvd");
    fs::write(&file, b"").expect("written");
    assert!(matches!(Store::open(StoreOptions::new(&file)), Err(StoreError::OpenError { .. })));
}

#[test]
fn test_open_corrupt_file() {
    let root = Builder::new().prefix("test_open_corrupt").tempdir().expect("tempdir");
    let path = root.path().join("store.kvh");
    fs::write(&path, b"not a store at all").expect("written");
    match Store::open(StoreOptions::new(&path)) {
        Err(StoreError::OpenError {
            cause: ErrorImpl::BadMagic(_),
            ..
        }) => (),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_read_only_rejects_writes() {
    let root = Builder::new().prefix("test_read_only").tempdir().expect("tempdir");
    let path = root.path().join("store.kvt");
    {
        let mut store = Store::open(StoreOptions::new(&path)).expect("created");
        store.set("a", 1).expect("set");
    }

    let mut store = Store::open(StoreOptions::new(&path).read_only()).expect("opened");
    assert!(matches!(store.set("b", 2), Err(StoreError::EngineError(ErrorImpl::ReadOnly))));
    assert!(matches!(store.delete("a"), Err(StoreError::EngineError(ErrorImpl::ReadOnly))));
    assert!(matches!(store.clear(), Err(StoreError::EngineError(ErrorImpl::ReadOnly))));
    assert_eq!(store.get("a").expect("get"), Value::Int(1));
}

#[test]
fn test_truncate() {
    let root = Builder::new().prefix("test_truncate").tempdir().expect("tempdir");
    let path = root.path().join("store.kvf");
    {
        let mut store = Store::open(StoreOptions::new(&path)).expect("created");
        store.set("a", 1).expect("set");
    }
    let store = Store::open(StoreOptions::new(&path).flags(OpenFlags::default() | OpenFlags::TRUNCATE))
        .expect("truncated");
    assert!(store.is_empty().expect("empty"));
}

#[test]
fn test_path_and_engine_kind() {
    let root = Builder::new().prefix("test_path").tempdir().expect("tempdir");
    let path = root.path().join("store.kvd");
    let store = Store::open(StoreOptions::new(&path)).expect("opened");
    assert_eq!(store.engine_kind().expect("kind"), EngineKind::Dir);
    assert_eq!(store.path().expect("path"), path.canonicalize().expect("canonical"));
    assert_eq!(store.options().engine, EngineKind::Poly);

    let memory = Store::open(StoreOptions::in_memory()).expect("opened");
    assert_eq!(memory.path().expect("path").to_str(), Some("+"));
}

#[test]
fn test_raw_codec_is_bytes_only() {
    let mut store = Store::open(StoreOptions::in_memory().codec(CodecKind::Raw)).expect("opened");
    store.set(b"k", b"").expect("set");
    assert_eq!(store.get(b"k").expect("get"), Value::Blob(vec![]));
    assert!(matches!(
        store.set("k", b"v"),
        Err(StoreError::EncodeError(DataError::UnsupportedType {
            codec: "raw",
            ..
        }))
    ));
}

#[test]
fn test_decode_failure_surfaces() {
    let root = Builder::new().prefix("test_decode_failure").tempdir().expect("tempdir");
    let path = root.path().join("store.kvt");
    let good_key = ObjectCodec.encode(&Value::from("corrupt")).expect("encoded");
    {
        // One undecodable key, and one good key with an undecodable value.
        let mut store = Store::open_with_codec(StoreOptions::new(&path), RawCodec).expect("opened");
        store.set(Value::from(b"\x01\x0e"), b"\x07").expect("set");
        store.set(Value::from(good_key), b"\x07").expect("set");
    }

    let mut store = Store::open(StoreOptions::new(&path)).expect("opened");
    assert_eq!(store.len().expect("len"), 2);

    // A corrupt value is not a miss.
    assert!(matches!(store.get("corrupt"), Err(StoreError::DecodeError(DataError::UnknownVersion(7)))));
    assert!(matches!(store.get("absent"), Err(StoreError::KeyNotFound(_))));
    assert!(store.contains("corrupt").expect("contains"));

    assert!(matches!(store.keys(), Err(StoreError::DecodeError(_))));
    let mut cursor = store.iter_keys().expect("cursor");
    assert!(matches!(cursor.next(), Some(Err(StoreError::DecodeError(_)))));

    // The entry is seized before decoding, so it is gone either way.
    assert!(matches!(store.pop("corrupt"), Err(StoreError::DecodeError(_))));
    assert!(matches!(store.pop_or("absent", Value::Nil), Ok(Value::Nil)));
    assert!(!store.contains("corrupt").expect("contains"));
    assert_eq!(store.len().expect("len"), 1);
}

#[derive(Debug)]
struct UpperCodec;

impl Codec for UpperCodec {
    fn name(&self) -> &'static str {
        "upper"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, DataError> {
        match value.as_str() {
            Some(s) => Ok(s.to_uppercase().into_bytes()),
            None => RawCodec.encode(value),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, DataError> {
        Ok(Value::from(String::from_utf8_lossy(bytes).into_owned()))
    }
}

#[test]
fn test_custom_codec() {
    let mut store = Store::open_with_codec(StoreOptions::in_memory(), UpperCodec).expect("opened");
    store.set("key", "value").expect("set");
    assert_eq!(store.get("KEY").expect("get"), Value::from("VALUE"));
    assert_eq!(store.keys().expect("keys"), vec![Value::from("KEY")]);
}
