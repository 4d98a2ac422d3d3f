// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

//! A dictionary-like interface over embedded key-value engines.
//!
//! A [`Store`] maps application [`Value`]s to [`Value`]s. Keys and values are
//! turned into byte strings by a [`Codec`] on the way in and back on the way
//! out; the bytes live in one of several engines picked by [`EngineKind`]:
//!
//! - `Tree`: an ordered map persisted to a single file.
//! - `Hash`: a bucketed hash table persisted to a single file.
//! - `Dir`: a directory with one file per record.
//! - `Forest`: a directory of ordered shards.
//! - `Poly`: picks one of the above from the path. `+` and `*` open in-memory
//!   tree and hash engines respectively.
//!
//! ## Basic Usage
//! ```
//! use kabinet::{Store, StoreError, StoreOptions, Value};
//! use tempfile::Builder;
//!
//! // Open a tree engine in a temporary directory; `Poly` picks the engine from
//! // the `.kvt` extension.
//! let root = Builder::new().prefix("simple-db").tempdir().unwrap();
//! let path = root.path().join("store.kvt");
//! let mut store = Store::open(StoreOptions::new(&path)).unwrap();
//!
//! // Any `Value` can be a key or a value with the default object codec.
//! store.set("int", 1234).unwrap();
//! store.set("string", "héllo, yöu").unwrap();
//! store.set(7, vec![Value::Bool(true), Value::Nil]).unwrap();
//!
//! assert_eq!(store.get("int").unwrap(), Value::Int(1234));
//! assert_eq!(store.len().unwrap(), 3);
//!
//! // Missing keys are errors; `pop_or` supplies a default instead.
//! assert!(matches!(store.get("missing"), Err(StoreError::KeyNotFound(_))));
//! assert_eq!(store.pop_or("missing", "fallback").unwrap(), Value::from("fallback"));
//!
//! // Keys come back in the engine's order.
//! for key in store.iter_keys().unwrap() {
//!     println!("{:?}", key.unwrap());
//! }
//!
//! // Closing flushes the engine; the data is there when it's opened again.
//! store.close().unwrap();
//! assert!(matches!(store.len(), Err(StoreError::ClosedError)));
//!
//! let store = Store::open(StoreOptions::new(&path).read_only()).unwrap();
//! assert_eq!(store.get("string").unwrap(), Value::from("héllo, yöu"));
//! ```

pub mod backend;
mod codec;
mod error;
mod helpers;
mod options;
mod store;
mod value;

pub use backend::{
    EngineKind,
    OpenFlags,
};
pub use codec::{
    Codec,
    CodecKind,
    ObjectCodec,
    RawCodec,
};
pub use error::{
    DataError,
    StoreError,
};
pub use options::StoreOptions;
pub use store::cursor::{
    Cursor,
    Yield,
    YieldMode,
};
pub use store::update::{
    MappingSource,
    UpdateArgs,
    UpdateSource,
};
pub use store::Store;
pub use value::{
    Type,
    Value,
};
