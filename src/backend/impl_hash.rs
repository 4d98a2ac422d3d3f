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

const MAGIC: Magic = *b"KVHS";
const INITIAL_BUCKETS: usize = 64;
const MAX_LOAD: usize = 4;

/// Separate chaining with crc32c. Each bucket is kept sorted by key, which gives
/// the table a native order: bucket index first, then key. That order survives
/// any mutation except a resize.
#[derive(Debug)]
struct Table {
    buckets: Vec<Vec<Record>>,
    len: usize,
}

impl Table {
    fn new() -> Table {
        Table {
            buckets: vec![Vec::new(); INITIAL_BUCKETS],
            len: 0,
        }
    }

    fn bucket_of(&self, key: &[u8]) -> usize {
        crc32c::crc32c(key) as usize % self.buckets.len()
    }

    fn find(&self, key: &[u8]) -> (usize, Result<usize, usize>) {
        let b = self.bucket_of(key);
        (b, self.buckets[b].binary_search_by(|(k, _)| k.as_slice().cmp(key)))
    }

    fn get(&self, key: &[u8]) -> Option<&Vec<u8>> {
        match self.find(key) {
            (b, Ok(i)) => Some(&self.buckets[b][i].1),
            _ => None,
        }
    }

    fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) {
        match self.find(&key) {
            (b, Ok(i)) => self.buckets[b][i].1 = value,
            (b, Err(i)) => {
                self.buckets[b].insert(i, (key, value));
                self.len += 1;
                if self.len > self.buckets.len() * MAX_LOAD {
                    self.grow();
                }
            },
        }
    }

    fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        match self.find(key) {
            (b, Ok(i)) => {
                self.len -= 1;
                Some(self.buckets[b].remove(i).1)
            },
            _ => None,
        }
    }

    fn grow(&mut self) {
        let n = self.buckets.len() * 2;
        let old = std::mem::replace(&mut self.buckets, vec![Vec::new(); n]);
        self.len = 0;
        for (key, value) in old.into_iter().flatten() {
            self.insert(key, value);
        }
    }

    fn next_after(&self, key: Option<&[u8]>) -> Option<&Record> {
        let start = match key {
            None => 0,
            Some(key) => {
                let b = self.bucket_of(key);
                let bucket = &self.buckets[b];
                let i = bucket.partition_point(|(k, _)| k.as_slice() <= key);
                if let Some(record) = bucket.get(i) {
                    return Some(record);
                }
                b + 1
            },
        };
        self.buckets[start..].iter().find_map(|bucket| bucket.first())
    }

    fn iter(&self) -> impl Iterator<Item = &Record> {
        self.buckets.iter().flatten()
    }
}

/// An unordered engine persisted like `TreeEngine`, one file written whole.
#[derive(Debug)]
pub struct HashEngine {
    path: PathBuf,
    flags: OpenFlags,
    persistent: bool,
    dirty: bool,
    table: Table,
}

impl HashEngine {
    pub fn open(path: &Path, flags: OpenFlags) -> Result<HashEngine, ErrorImpl> {
        let records = snapshot::open_file(path, &MAGIC, flags)?;
        debug!("Opened hash engine at {:?} with {} records", path, records.len());
        let mut table = Table::new();
        for (key, value) in records {
            table.insert(key, value);
        }
        Ok(HashEngine {
            path: canonicalize_path(path)?,
            flags,
            persistent: true,
            dirty: false,
            table,
        })
    }

    pub fn in_memory(path: &Path, flags: OpenFlags) -> HashEngine {
        HashEngine {
            path: path.to_path_buf(),
            flags,
            persistent: false,
            dirty: false,
            table: Table::new(),
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

impl BackendEngine for HashEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Hash
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ErrorImpl> {
        Ok(self.table.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), ErrorImpl> {
        self.writable()?;
        self.table.insert(key.to_vec(), value.to_vec());
        self.written()
    }

    fn remove(&mut self, key: &[u8]) -> Result<bool, ErrorImpl> {
        Ok(self.seize(key)?.is_some())
    }

    fn seize(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, ErrorImpl> {
        self.writable()?;
        let value = self.table.remove(key);
        if value.is_some() {
            self.written()?;
        }
        Ok(value)
    }

    fn check(&self, key: &[u8]) -> Result<Option<usize>, ErrorImpl> {
        Ok(self.table.get(key).map(Vec::len))
    }

    fn count(&self) -> Result<usize, ErrorImpl> {
        Ok(self.table.len)
    }

    fn next_after(&self, key: Option<&[u8]>) -> Result<Option<Record>, ErrorImpl> {
        Ok(self.table.next_after(key).cloned())
    }

    fn sync(&mut self) -> Result<(), ErrorImpl> {
        if !self.persistent || !self.dirty {
            return Ok(());
        }
        let records = self.table.iter().map(|(k, v)| (k.as_slice(), v.as_slice()));
        snapshot::write_records(&self.path, &MAGIC, self.table.len, records)?;
        self.dirty = false;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ErrorImpl> {
        self.sync()?;
        self.table = Table::new();
        Ok(())
    }
}
