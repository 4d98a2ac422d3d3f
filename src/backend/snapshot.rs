// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

//! The on-disk layout shared by the single-file engines and forest shards:
//!
//! ```text
//! magic: [u8; 4] | version: u32 LE | count: u64 LE | count x bincode((Vec<u8>, Vec<u8>))
//! ```
//!
//! Files are rewritten whole, through a sibling temporary file and a rename.

use std::fs::{
    self,
    File,
};
use std::io::{
    BufReader,
    BufWriter,
    Read,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use byteorder::{
    LittleEndian,
    ReadBytesExt,
    WriteBytesExt,
};
use log::warn;

use super::{
    ErrorImpl,
    OpenFlags,
    Record,
};

pub(crate) const FILE_FORMAT_VERSION: u32 = 1;

pub(crate) type Magic = [u8; 4];

pub(crate) fn read_records(path: &Path, magic: &Magic) -> Result<Vec<Record>, ErrorImpl> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut found = [0u8; 4];
    reader.read_exact(&mut found).map_err(|_| ErrorImpl::BadMagic(path.to_path_buf()))?;
    if &found != magic {
        return Err(ErrorImpl::BadMagic(path.to_path_buf()));
    }
    let version = reader.read_u32::<LittleEndian>()?;
    if version != FILE_FORMAT_VERSION {
        return Err(ErrorImpl::UnsupportedVersion(version));
    }
    let count = reader.read_u64::<LittleEndian>()?;
    let mut records = Vec::new();
    for _ in 0..count {
        let record: Record = bincode::deserialize_from(&mut reader)?;
        records.push(record);
    }
    Ok(records)
}

pub(crate) fn write_records<'r, I>(path: &Path, magic: &Magic, count: usize, records: I) -> Result<(), ErrorImpl>
where
    I: Iterator<Item = (&'r [u8], &'r [u8])>,
{
    let tmp = temporary_sibling(path);
    {
        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(magic)?;
        writer.write_u32::<LittleEndian>(FILE_FORMAT_VERSION)?;
        writer.write_u64::<LittleEndian>(count as u64)?;
        for record in records {
            bincode::serialize_into(&mut writer, &record)?;
        }
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Apply the open flags to a single store file and return its records.
///
/// A missing file is created (empty) when both `WRITER` and `CREATE` are set, so
/// the path exists and can be canonicalized once this returns.
pub(crate) fn open_file(path: &Path, magic: &Magic, flags: OpenFlags) -> Result<Vec<Record>, ErrorImpl> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(ErrorImpl::UnsuitablePath(path.to_path_buf())),
        Ok(_) => {
            if flags.contains(OpenFlags::TRUNCATE) {
                if flags.is_writable() {
                    write_records(path, magic, 0, std::iter::empty())?;
                    return Ok(vec![]);
                }
                warn!("Ignoring `TRUNCATE` for read-only {:?}", path);
            }
            read_records(path, magic)
        },
        Err(_) if flags.is_writable() && flags.contains(OpenFlags::CREATE) => {
            write_records(path, magic, 0, std::iter::empty())?;
            Ok(vec![])
        },
        Err(_) => Err(ErrorImpl::NotFound(path.to_path_buf())),
    }
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use tempfile::Builder;

    use super::*;

    const MAGIC: Magic = *b"TEST";

    #[test]
    fn test_write_then_read() {
        let root = Builder::new().prefix("test_write_then_read").tempdir().expect("tempdir");
        let path = root.path().join("records");
        let records = vec![(b"k\0".to_vec(), vec![]), (vec![], b"v".to_vec())];
        write_records(&path, &MAGIC, records.len(), records.iter().map(|(k, v)| (k.as_slice(), v.as_slice())))
            .expect("written");
        assert_eq!(read_records(&path, &MAGIC).expect("read"), records);
        assert!(!temporary_sibling(&path).exists());
    }

    #[test]
    fn test_bad_magic() {
        let root = Builder::new().prefix("test_bad_magic").tempdir().expect("tempdir");
        let path = root.path().join("records");
        fs::write(&path, b"nope, not a store").expect("written");
        assert!(matches!(read_records(&path, &MAGIC), Err(ErrorImpl::BadMagic(_))));

        fs::write(&path, b"").expect("written");
        assert!(matches!(read_records(&path, &MAGIC), Err(ErrorImpl::BadMagic(_))));
    }

    #[test]
    fn test_open_file_flags() {
        let root = Builder::new().prefix("test_open_file_flags").tempdir().expect("tempdir");
        let path = root.path().join("records");

        assert!(matches!(open_file(&path, &MAGIC, OpenFlags::READER), Err(ErrorImpl::NotFound(_))));
        assert!(matches!(open_file(&path, &MAGIC, OpenFlags::WRITER), Err(ErrorImpl::NotFound(_))));
        assert!(open_file(&path, &MAGIC, OpenFlags::default()).expect("created").is_empty());
        assert!(path.exists());

        let records = vec![(b"a".to_vec(), b"1".to_vec())];
        write_records(&path, &MAGIC, 1, records.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))).expect("written");
        assert_eq!(open_file(&path, &MAGIC, OpenFlags::READER | OpenFlags::TRUNCATE).expect("opened"), records);
        assert!(open_file(&path, &MAGIC, OpenFlags::WRITER | OpenFlags::TRUNCATE).expect("opened").is_empty());
        assert!(read_records(&path, &MAGIC).expect("read").is_empty());

        assert!(matches!(open_file(root.path(), &MAGIC, OpenFlags::default()), Err(ErrorImpl::UnsuitablePath(_))));
    }
}
