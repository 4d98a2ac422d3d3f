// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::path::{
    Path,
    PathBuf,
};

use serde_derive::{
    Deserialize,
    Serialize,
};

use crate::backend::{
    EngineKind,
    OpenFlags,
};
use crate::codec::CodecKind;

/// Everything needed to open a store.
///
/// ```
/// use kabinet::{CodecKind, EngineKind, OpenFlags, StoreOptions};
///
/// let options = StoreOptions::new("+")
///     .engine(EngineKind::Poly)
///     .flags(OpenFlags::WRITER | OpenFlags::CREATE)
///     .codec(CodecKind::Raw);
/// assert_eq!(options.path.to_str(), Some("+"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    pub path: PathBuf,
    #[serde(default)]
    pub flags: OpenFlags,
    #[serde(default)]
    pub engine: EngineKind,
    #[serde(default)]
    pub codec: CodecKind,
}

impl StoreOptions {
    pub fn new<P: AsRef<Path>>(path: P) -> StoreOptions {
        StoreOptions {
            path: path.as_ref().to_path_buf(),
            flags: OpenFlags::default(),
            engine: EngineKind::default(),
            codec: CodecKind::default(),
        }
    }

    /// An in-memory, ordered store.
    pub fn in_memory() -> StoreOptions {
        StoreOptions::new("+")
    }

    pub fn flags(mut self, flags: OpenFlags) -> StoreOptions {
        self.flags = flags;
        self
    }

    pub fn engine(mut self, engine: EngineKind) -> StoreOptions {
        self.engine = engine;
        self
    }

    pub fn codec(mut self, codec: CodecKind) -> StoreOptions {
        self.codec = codec;
        self
    }

    pub fn read_only(self) -> StoreOptions {
        self.flags(OpenFlags::READER)
    }
}
