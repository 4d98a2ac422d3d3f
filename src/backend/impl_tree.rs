// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::{
    Path,
    PathBuf,
};

use log::debug;

use super::snapshot::{
    self,
    Magic,
};
use super::{
    BackendEngine,
    EngineKind,
    ErrorImpl,
    OpenFlags,
    Record,
};
use crate::helpers::canonicalize_path;

const MAGIC: Magic = *b"KVTR";

/// An ordered engine: one `BTreeMap`, written out whole on `sync`.
#[derive(Debug)]
pub struct TreeEngine {
    path: PathBuf,
    flags: OpenFlags,
    persistent: bool,
    dirty: bool,
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl TreeEngine {
    pub fn open(path: &Path, flags: OpenFlags) -> Result<TreeEngine, ErrorImpl> {
        let records = snapshot::open_file(path, &MAGIC, flags)?;
        debug!("Opened tree engine at {:?} with {} records", path, records.len());
        Ok(TreeEngine {
            path: canonicalize_path(path)?,
            flags,
            persistent: true,
            dirty: false,
            map: records.into_iter().collect(),
        })
    }

    /// An engine that lives and dies with the process. `path` is only a name.
    pub fn in_memory(path: &Path, flags: OpenFlags) -> TreeEngine {
        TreeEngine {
            path: path.to_path_buf(),
            flags,
            persistent: false,
            dirty: false,
            map: BTreeMap::new(),
        }
    }

    fn writable(&self) -> Result<(), ErrorImpl> {
        if self.flags.is_writable() {
            Ok(())
        } else {
            Err(ErrorImpl::ReadOnly)
        }
    }

    fn written(&mut self) -> Result<(), ErrorImpl> {
        self.dirty = true;
        if self.flags.contains(OpenFlags::AUTO_SYNC) {
            self.sync()?;
        }
        Ok(())
    }
}

impl BackendEngine for TreeEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Tree
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ErrorImpl> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), ErrorImpl> {
        self.writable()?;
        self.map.insert(key.to_vec(), value.to_vec());
        self.written()
    }

    fn remove(&mut self, key: &[u8]) -> Result<bool, ErrorImpl> {
        self.writable()?;
        if self.map.remove(key).is_none() {
            return Ok(false);
        }
        self.written()?;
        Ok(true)
    }

    fn seize(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, ErrorImpl> {
        self.writable()?;
        let value = self.map.remove(key);
        if value.is_some() {
            self.written()?;
        }
        Ok(value)
    }

    fn check(&self, key: &[u8]) -> Result<Option<usize>, ErrorImpl> {
        Ok(self.map.get(key).map(Vec::len))
    }

    fn count(&self) -> Result<usize, ErrorImpl> {
        Ok(self.map.len())
    }

    fn next_after(&self, key: Option<&[u8]>) -> Result<Option<Record>, ErrorImpl> {
        let lower = match key {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        Ok(self.map.range::<[u8], _>((lower, Bound::Unbounded)).next().map(|(k, v)| (k.clone(), v.clone())))
    }

    fn sync(&mut self) -> Result<(), ErrorImpl> {
        if !self.persistent || !self.dirty {
            return Ok(());
        }
        let records = self.map.iter().map(|(k, v)| (k.as_slice(), v.as_slice()));
        snapshot::write_records(&self.path, &MAGIC, self.map.len(), records)?;
        self.dirty = false;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ErrorImpl> {
        self.sync()?;
        self.map.clear();
        Ok(())
    }
}
