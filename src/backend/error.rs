// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErrorImpl {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("bincode error: {0}")]
    BincodeError(#[from] Box<bincode::ErrorKind>),

    #[error("{0:?} does not exist")]
    NotFound(PathBuf),

    #[error("{0:?} is not suitable for this engine")]
    UnsuitablePath(PathBuf),

    #[error("{0:?} is not a store file")]
    BadMagic(PathBuf),

    #[error("{0:?} is not a valid record file")]
    CorruptRecord(PathBuf),

    #[error("unsupported file format version {0}")]
    UnsupportedVersion(u32),

    #[error("the engine was opened read-only")]
    ReadOnly,
}
