// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

//! The generic engine: the path decides which concrete engine serves it.
//!
//! | path            | engine            |
//! |-----------------|-------------------|
//! | `+`             | in-memory tree    |
//! | `*`             | in-memory hash    |
//! | `*.kvt`         | tree              |
//! | `*.kvh`         | hash              |
//! | `*.kvd`         | dir               |
//! | `*.kvf`         | forest            |

use std::path::Path;

use log::debug;

use super::{
    BackendEngine,
    DirEngine,
    ErrorImpl,
    ForestEngine,
    HashEngine,
    OpenFlags,
    TreeEngine,
};

pub(crate) fn open(path: &Path, flags: OpenFlags) -> Result<Box<dyn BackendEngine>, ErrorImpl> {
    if path == Path::new("+") {
        debug!("Opening an in-memory tree engine");
        return Ok(Box::new(TreeEngine::in_memory(path, flags)));
    }
    if path == Path::new("*") {
        debug!("Opening an in-memory hash engine");
        return Ok(Box::new(HashEngine::in_memory(path, flags)));
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("kvt") => Ok(Box::new(TreeEngine::open(path, flags)?)),
        Some("kvh") => Ok(Box::new(HashEngine::open(path, flags)?)),
        Some("kvd") => Ok(Box::new(DirEngine::open(path, flags)?)),
        Some("kvf") => Ok(Box::new(ForestEngine::open(path, flags)?)),
        _ => Err(ErrorImpl::UnsuitablePath(path.to_path_buf())),
    }
}
