// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::fmt::Debug;
use std::path::Path;

use super::{
    EngineKind,
    ErrorImpl,
    RawCursor,
};

/// An encoded key and its encoded value.
pub type Record = (Vec<u8>, Vec<u8>);

/// The raw byte-key to byte-value contract every engine fulfils.
///
/// Keys and values are binary-safe: they may be empty and may contain zero
/// bytes. Engines are not required to be thread-safe.
pub trait BackendEngine: Debug {
    /// The engine that actually serves requests; `Poly` reports its pick.
    fn kind(&self) -> EngineKind;

    fn path(&self) -> &Path;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ErrorImpl>;

    /// Insert or overwrite.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), ErrorImpl>;

    /// Returns whether a record existed.
    fn remove(&mut self, key: &[u8]) -> Result<bool, ErrorImpl>;

    /// Fetch and remove in one step.
    fn seize(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, ErrorImpl>;

    /// The size of the stored value, if the key exists.
    fn check(&self, key: &[u8]) -> Result<Option<usize>, ErrorImpl>;

    fn count(&self) -> Result<usize, ErrorImpl>;

    /// The first record strictly after `key` in the engine's native order, or
    /// the very first record when `key` is `None`. `key` need not exist.
    fn next_after(&self, key: Option<&[u8]>) -> Result<Option<Record>, ErrorImpl>;

    /// Flush pending writes to durable storage.
    fn sync(&mut self) -> Result<(), ErrorImpl>;

    /// Flush and release. The engine must not be used afterwards.
    fn close(&mut self) -> Result<(), ErrorImpl>;

    fn cursor(&self) -> RawCursor {
        RawCursor::new()
    }
}
