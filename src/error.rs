// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::path::PathBuf;

use thiserror::Error;

use crate::backend::ErrorImpl;
use crate::value::{
    Type,
    Value,
};

/// Failures of a `Codec`. These are always wrapped in either
/// `StoreError::EncodeError` or `StoreError::DecodeError`, so that callers can
/// tell which direction failed.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("the {codec} codec cannot represent a value of type {actual}")]
    UnsupportedType {
        codec: &'static str,
        actual: Type,
    },

    #[error("empty data; expected a format version")]
    Empty,

    #[error("unknown format version: {0}")]
    UnknownVersion(u8),

    #[error("couldn't encode value: {0}")]
    EncodingError(Box<bincode::ErrorKind>),

    #[error("couldn't decode value: {0}")]
    DecodingError(Box<bincode::ErrorKind>),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open {path:?}: {cause}")]
    OpenError {
        path: PathBuf,
        cause: ErrorImpl,
    },

    #[error("engine {0:?} is not supported")]
    UnsupportedEngineError(String),

    #[error("the store is closed")]
    ClosedError,

    #[error("key not found: {0}")]
    KeyNotFound(Value),

    #[error("encode error: {0}")]
    EncodeError(DataError),

    #[error("decode error: {0}")]
    DecodeError(DataError),

    #[error("engine error: {0}")]
    EngineError(ErrorImpl),

    #[error("argument error: {0}")]
    ArgumentError(String),
}

impl StoreError {
    pub(crate) fn open(path: PathBuf, cause: ErrorImpl) -> StoreError {
        StoreError::OpenError {
            path,
            cause,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound(_))
    }
}

impl From<ErrorImpl> for StoreError {
    fn from(e: ErrorImpl) -> StoreError {
        StoreError::EngineError(e)
    }
}
