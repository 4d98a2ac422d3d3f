// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde_derive::{
    Deserialize,
    Serialize,
};

use crate::error::StoreError;

bitflags! {
    /// How an engine is opened. Without `WRITER` an engine is read-only.
    #[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct OpenFlags: u32 {
        const READER = 0b0000_0001;
        const WRITER = 0b0000_0010;
        const CREATE = 0b0000_0100;
        const TRUNCATE = 0b0000_1000;
        const AUTO_SYNC = 0b0001_0000;
    }
}

impl Default for OpenFlags {
    fn default() -> OpenFlags {
        OpenFlags::WRITER | OpenFlags::CREATE
    }
}

impl OpenFlags {
    pub fn is_writable(self) -> bool {
        self.contains(OpenFlags::WRITER)
    }

    /// Parse a `|`-separated list of flag names, ignoring case and whitespace.
    pub fn parse(s: &str) -> Result<OpenFlags, StoreError> {
        let mut flags = OpenFlags::empty();
        for name in s.split('|').map(str::trim).filter(|name| !name.is_empty()) {
            let flag = OpenFlags::from_name(&name.to_ascii_uppercase())
                .ok_or_else(|| StoreError::ArgumentError(format!("unknown open flag {:?}", name)))?;
            flags |= flag;
        }
        Ok(flags)
    }
}

/// The closed set of engines a store can be opened with.
///
/// Iteration order is a property of the engine: `Tree`, `Dir` and `Forest`
/// iterate in ascending byte order of the encoded key, `Hash` iterates in bucket
/// order, which is stable as long as the table isn't resized. `Poly` behaves like
/// whichever engine it picks.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum EngineKind {
    Tree,
    Hash,
    Dir,
    Forest,
    Poly,
}

impl Default for EngineKind {
    fn default() -> EngineKind {
        EngineKind::Poly
    }
}

impl EngineKind {
    pub fn is_ordered(self) -> bool {
        matches!(self, EngineKind::Tree | EngineKind::Dir | EngineKind::Forest)
    }
}

impl FromStr for EngineKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<EngineKind, StoreError> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_suffix("db").unwrap_or(&lower);
        match name {
            "tree" => Ok(EngineKind::Tree),
            "hash" => Ok(EngineKind::Hash),
            "dir" => Ok(EngineKind::Dir),
            "forest" => Ok(EngineKind::Forest),
            "poly" => Ok(EngineKind::Poly),
            _ => Err(StoreError::UnsupportedEngineError(s.to_string())),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            EngineKind::Tree => "tree",
            EngineKind::Hash => "hash",
            EngineKind::Dir => "dir",
            EngineKind::Forest => "forest",
            EngineKind::Poly => "poly",
        })
    }
}
