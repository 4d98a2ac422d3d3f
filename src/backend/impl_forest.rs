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
use std::fs;
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

const MAGIC: Magic = *b"KVFS";
pub const SHARDS: usize = 8;

#[derive(Debug, Default)]
struct Shard {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
    dirty: bool,
}

/// A directory of ordered shards. A key lives in the shard picked by its
/// crc32c; iteration merges the shards back into ascending key order. Only
/// shards that changed are rewritten on `sync`.
#[derive(Debug)]
pub struct ForestEngine {
    path: PathBuf,
    flags: OpenFlags,
    shards: Vec<Shard>,
}

impl ForestEngine {
    pub fn open(path: &Path, flags: OpenFlags) -> Result<ForestEngine, ErrorImpl> {
        match fs::metadata(path) {
            Ok(meta) if !meta.is_dir() => return Err(ErrorImpl::UnsuitablePath(path.to_path_buf())),
            Ok(_) => (),
            Err(_) if flags.is_writable() && flags.contains(OpenFlags::CREATE) => fs::create_dir_all(path)?,
            Err(_) => return Err(ErrorImpl::NotFound(path.to_path_buf())),
        }
        let path = canonicalize_path(path)?;

        // If any shard fails to load, the ones already loaded are dropped with `shards`.
        let mut shards: Vec<Shard> = (0..SHARDS).map(|_| Shard::default()).collect();
        for i in 0..SHARDS {
            for (key, value) in snapshot::open_file(&Self::shard_path(&path, i), &MAGIC, flags)? {
                let s = Self::shard_of(&key);
                shards[s].map.insert(key, value);
            }
        }

        let engine = ForestEngine {
            path,
            flags,
            shards,
        };
        debug!("Opened forest engine at {:?} with {} records", engine.path, engine.len());
        Ok(engine)
    }

    fn shard_path(dir: &Path, i: usize) -> PathBuf {
        dir.join(format!("shard-{:02}.kvs", i))
    }

    fn shard_of(key: &[u8]) -> usize {
        crc32c::crc32c(key) as usize % SHARDS
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|s| s.map.len()).sum()
    }

    fn writable(&self) -> Result<(), ErrorImpl> {
        if self.flags.is_writable() {
            Ok(())
        } else {
            Err(ErrorImpl::ReadOnly)
        }
    }

    fn written(&mut self, shard: usize) -> Result<(), ErrorImpl> {
        self.shards[shard].dirty = true;
        if self.flags.contains(OpenFlags::AUTO_SYNC) {
            self.sync()?;
        }
        Ok(())
    }
}

impl BackendEngine for ForestEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Forest
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ErrorImpl> {
        Ok(self.shards[Self::shard_of(key)].map.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), ErrorImpl> {
        self.writable()?;
        let s = Self::shard_of(key);
        self.shards[s].map.insert(key.to_vec(), value.to_vec());
        self.written(s)
    }

    fn remove(&mut self, key: &[u8]) -> Result<bool, ErrorImpl> {
        Ok(self.seize(key)?.is_some())
    }

    fn seize(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, ErrorImpl> {
        self.writable()?;
        let s = Self::shard_of(key);
        let value = self.shards[s].map.remove(key);
        if value.is_some() {
            self.written(s)?;
        }
        Ok(value)
    }

    fn check(&self, key: &[u8]) -> Result<Option<usize>, ErrorImpl> {
        Ok(self.shards[Self::shard_of(key)].map.get(key).map(Vec::len))
    }

    fn count(&self) -> Result<usize, ErrorImpl> {
        Ok(self.len())
    }

    fn next_after(&self, key: Option<&[u8]>) -> Result<Option<Record>, ErrorImpl> {
        let lower = match key {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        Ok(self
            .shards
            .iter()
            .filter_map(|s| s.map.range::<[u8], _>((lower, Bound::Unbounded)).next())
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(k, v)| (k.clone(), v.clone())))
    }

    fn sync(&mut self) -> Result<(), ErrorImpl> {
        for (i, shard) in self.shards.iter_mut().enumerate().filter(|(_, s)| s.dirty) {
            let records = shard.map.iter().map(|(k, v)| (k.as_slice(), v.as_slice()));
            snapshot::write_records(&Self::shard_path(&self.path, i), &MAGIC, shard.map.len(), records)?;
            shard.dirty = false;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), ErrorImpl> {
        self.sync()?;
        self.shards.clear();
        Ok(())
    }
}
