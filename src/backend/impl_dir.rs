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
use std::convert::TryFrom;
use std::fs::{
    self,
    File,
};
use std::io::{
    self,
    Write,
};
use std::ops::Bound;
use std::path::{
    Path,
    PathBuf,
};

use byteorder::{
    LittleEndian,
    ReadBytesExt,
    WriteBytesExt,
};
use log::{
    debug,
    warn,
};
use sha2::{
    Digest,
    Sha256,
};

use super::{
    BackendEngine,
    EngineKind,
    ErrorImpl,
    OpenFlags,
    Record,
};
use crate::helpers::canonicalize_path;

const RECORD_PREFIX: &str = "k";
const DIGEST_HEX_LEN: usize = 64;

/// One file per record, written through on every mutation.
///
/// A record file is named `k` followed by the hex SHA-256 of its key, so names
/// have a fixed width however long the key is. The file holds the key as well:
///
/// ```text
/// key length: u32 LE | key | value
/// ```
///
/// The in-memory index maps keys to file names and gives the engine its
/// ascending key order.
#[derive(Debug)]
pub struct DirEngine {
    path: PathBuf,
    flags: OpenFlags,
    index: BTreeMap<Vec<u8>, String>,
}

impl DirEngine {
    pub fn open(path: &Path, flags: OpenFlags) -> Result<DirEngine, ErrorImpl> {
        match fs::metadata(path) {
            Ok(meta) if !meta.is_dir() => return Err(ErrorImpl::UnsuitablePath(path.to_path_buf())),
            Ok(_) => (),
            Err(_) if flags.is_writable() && flags.contains(OpenFlags::CREATE) => fs::create_dir_all(path)?,
            Err(_) => return Err(ErrorImpl::NotFound(path.to_path_buf())),
        }

        let mut engine = DirEngine {
            path: canonicalize_path(path)?,
            flags,
            index: BTreeMap::new(),
        };
        for entry in fs::read_dir(&engine.path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = match file_name.to_str().filter(|name| Self::is_record_name(name)) {
                Some(name) => name.to_string(),
                None => {
                    warn!("Ignoring stray file {:?} in {:?}", file_name, engine.path);
                    continue;
                },
            };
            let (key, _) = Self::split_record(&entry.path(), fs::read(entry.path())?)?;
            if Self::name_of(&key) != name {
                warn!("Ignoring misnamed record {:?} in {:?}", name, engine.path);
                continue;
            }
            engine.index.insert(key, name);
        }

        if flags.contains(OpenFlags::TRUNCATE) {
            if flags.is_writable() {
                while let Some((_, name)) = engine.index.pop_first() {
                    fs::remove_file(engine.path.join(name))?;
                }
            } else {
                warn!("Ignoring `TRUNCATE` for read-only {:?}", engine.path);
            }
        }

        debug!("Opened dir engine at {:?} with {} records", engine.path, engine.index.len());
        Ok(engine)
    }

    fn name_of(key: &[u8]) -> String {
        format!("{}{}", RECORD_PREFIX, hex::encode(Sha256::digest(key)))
    }

    /// Only what `name_of` produces: the prefix and lowercase hex digits.
    fn is_record_name(name: &str) -> bool {
        match name.strip_prefix(RECORD_PREFIX) {
            Some(digest) => {
                digest.len() == DIGEST_HEX_LEN && digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
            },
            None => false,
        }
    }

    fn split_record(path: &Path, mut bytes: Vec<u8>) -> Result<Record, ErrorImpl> {
        let corrupt = || ErrorImpl::CorruptRecord(path.to_path_buf());
        let mut header = &bytes[..];
        let key_len = header.read_u32::<LittleEndian>().map_err(|_| corrupt())? as usize;
        let body = 4 + key_len;
        if bytes.len() < body {
            return Err(corrupt());
        }
        let value = bytes.split_off(body);
        bytes.drain(..4);
        Ok((bytes, value))
    }

    fn writable(&self) -> Result<(), ErrorImpl> {
        if self.flags.is_writable() {
            Ok(())
        } else {
            Err(ErrorImpl::ReadOnly)
        }
    }

    fn read(&self, name: &str) -> Result<Option<Record>, ErrorImpl> {
        let path = self.path.join(name);
        match fs::read(&path) {
            Ok(bytes) => Self::split_record(&path, bytes).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl BackendEngine for DirEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Dir
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ErrorImpl> {
        match self.index.get(key) {
            Some(name) => Ok(self.read(name)?.map(|(_, value)| value)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), ErrorImpl> {
        self.writable()?;
        let key_len = u32::try_from(key.len()).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "key too long"))?;
        let name = Self::name_of(key);
        let tmp = self.path.join(format!(".{}.tmp", name));
        {
            let mut file = File::create(&tmp)?;
            file.write_u32::<LittleEndian>(key_len)?;
            file.write_all(key)?;
            file.write_all(value)?;
            if self.flags.contains(OpenFlags::AUTO_SYNC) {
                file.sync_all()?;
            }
        }
        fs::rename(&tmp, self.path.join(&name))?;
        self.index.insert(key.to_vec(), name);
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> Result<bool, ErrorImpl> {
        self.writable()?;
        match self.index.remove(key) {
            Some(name) => {
                fs::remove_file(self.path.join(name))?;
                Ok(true)
            },
            None => Ok(false),
        }
    }

    fn seize(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, ErrorImpl> {
        self.writable()?;
        let value = self.get(key)?;
        if value.is_some() {
            self.remove(key)?;
        }
        Ok(value)
    }

    fn check(&self, key: &[u8]) -> Result<Option<usize>, ErrorImpl> {
        match self.index.get(key) {
            Some(name) => {
                let len = fs::metadata(self.path.join(name))?.len() as usize;
                Ok(Some(len.saturating_sub(4 + key.len())))
            },
            None => Ok(None),
        }
    }

    fn count(&self) -> Result<usize, ErrorImpl> {
        Ok(self.index.len())
    }

    fn next_after(&self, key: Option<&[u8]>) -> Result<Option<Record>, ErrorImpl> {
        let lower = match key {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        for (key, name) in self.index.range::<[u8], _>((lower, Bound::Unbounded)) {
            if let Some((_, value)) = self.read(name)? {
                return Ok(Some((key.clone(), value)));
            }
        }
        Ok(None)
    }

    fn sync(&mut self) -> Result<(), ErrorImpl> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), ErrorImpl> {
        self.index.clear();
        Ok(())
    }
}
