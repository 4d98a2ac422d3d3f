// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

//! Byte-level storage engines. Everything in here deals in opaque byte strings;
//! encoding application values is the business of `crate::codec`.

mod common;
mod cursor;
mod error;
mod impl_dir;
mod impl_forest;
mod impl_hash;
mod impl_poly;
mod impl_tree;
mod snapshot;
mod traits;

use std::path::Path;

pub use common::*;
pub use cursor::RawCursor;
pub use error::ErrorImpl;
pub use traits::*;

pub use impl_dir::DirEngine;
pub use impl_forest::ForestEngine;
pub use impl_hash::HashEngine;
pub use impl_tree::TreeEngine;

/// Open the engine selected by `kind` at `path`.
///
/// Anything acquired before a failure is dropped before the error is returned.
pub fn open_engine(kind: EngineKind, path: &Path, flags: OpenFlags) -> Result<Box<dyn BackendEngine>, ErrorImpl> {
    Ok(match kind {
        EngineKind::Tree => Box::new(TreeEngine::open(path, flags)?),
        EngineKind::Hash => Box::new(HashEngine::open(path, flags)?),
        EngineKind::Dir => Box::new(DirEngine::open(path, flags)?),
        EngineKind::Forest => Box::new(ForestEngine::open(path, flags)?),
        EngineKind::Poly => impl_poly::open(path, flags)?,
    })
}
