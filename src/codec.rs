// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

//! Conversion between application values and the byte strings an engine stores.
//!
//! A codec is picked once, when a store is opened, and is used for both keys and
//! values. Two codecs are built in:
//!
//! * `RawCodec` stores blobs verbatim and refuses everything else.
//! * `ObjectCodec` stores any `Value`, prefixed by a format version byte.
//!
//! Other codecs can be plugged in by implementing `Codec` and passing it to
//! `Store::open_with_codec`.

use std::fmt;

use bincode::Options;
use serde_derive::{
    Deserialize,
    Serialize,
};

use crate::error::DataError;
use crate::value::Value;

/// Version byte written in front of every `ObjectCodec` payload.
pub const FORMAT_VERSION: u8 = 1;

pub trait Codec: fmt::Debug {
    /// A short name, used in error messages.
    fn name(&self) -> &'static str;

    fn encode(&self, value: &Value) -> Result<Vec<u8>, DataError>;

    fn decode(&self, bytes: &[u8]) -> Result<Value, DataError>;

    /// Turns the name of a named `update` override into a key.
    fn key_from_name(&self, name: &str) -> Value {
        Value::Str(name.to_string())
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum CodecKind {
    Raw,
    Object,
}

impl Default for CodecKind {
    fn default() -> CodecKind {
        CodecKind::Object
    }
}

impl CodecKind {
    pub fn build(self) -> Box<dyn Codec> {
        match self {
            CodecKind::Raw => Box::new(RawCodec),
            CodecKind::Object => Box::new(ObjectCodec),
        }
    }
}

/// Identity codec over byte strings.
#[derive(Debug, Default, Copy, Clone)]
pub struct RawCodec;

impl Codec for RawCodec {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, DataError> {
        match value {
            Value::Blob(bytes) => Ok(bytes.clone()),
            other => Err(DataError::UnsupportedType {
                codec: self.name(),
                actual: other.value_type(),
            }),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, DataError> {
        Ok(Value::Blob(bytes.to_vec()))
    }

    fn key_from_name(&self, name: &str) -> Value {
        Value::Blob(name.as_bytes().to_vec())
    }
}

/// Versioned bincode encoding of arbitrary `Value`s.
#[derive(Debug, Default, Copy, Clone)]
pub struct ObjectCodec;

impl ObjectCodec {
    fn options() -> impl Options {
        bincode::DefaultOptions::new()
    }
}

impl Codec for ObjectCodec {
    fn name(&self) -> &'static str {
        "object"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, DataError> {
        let mut bytes = vec![FORMAT_VERSION];
        Self::options().serialize_into(&mut bytes, value).map_err(DataError::EncodingError)?;
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, DataError> {
        let (version, body) = bytes.split_first().ok_or(DataError::Empty)?;
        if *version != FORMAT_VERSION {
            return Err(DataError::UnknownVersion(*version));
        }
        Self::options().deserialize(body).map_err(DataError::DecodingError)
    }
}
