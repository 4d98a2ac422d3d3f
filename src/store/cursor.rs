// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::backend::RawCursor;
use crate::error::StoreError;
use crate::store::Inner;
use crate::value::Value;

/// What a cursor yields for each entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YieldMode {
    Key,
    Value,
    Pair,
}

impl YieldMode {
    pub fn shape(self, key: Value, value: Value) -> Yield {
        match self {
            YieldMode::Key => Yield::Key(key),
            YieldMode::Value => Yield::Value(value),
            YieldMode::Pair => Yield::Pair(key, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Yield {
    Key(Value),
    Value(Value),
    Pair(Value, Value),
}

impl Yield {
    /// The key for `Key` and `Pair` yields.
    pub fn key(&self) -> Option<&Value> {
        match self {
            Yield::Key(key) | Yield::Pair(key, _) => Some(key),
            Yield::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Yield::Key(v) | Yield::Value(v) => v,
            Yield::Pair(k, v) => Value::List(vec![k, v]),
        }
    }
}

/// A single pass over a store, in the engine's order.
///
/// The cursor keeps the store's shared state alive, so it outlives the
/// `Store` handle it came from. Once exhausted it keeps returning `None`;
/// if the store is closed first, every step fails with `ClosedError`.
///
/// Both the key and the value of each entry are decoded whatever the mode,
/// so a record that fails to decode surfaces as `DecodeError` in any mode.
pub struct Cursor {
    inner: Rc<RefCell<Inner>>,
    raw: RawCursor,
    mode: YieldMode,
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cursor").field("raw", &self.raw).field("mode", &self.mode).finish()
    }
}

impl Cursor {
    pub(crate) fn new(inner: Rc<RefCell<Inner>>, mode: YieldMode) -> Result<Cursor, StoreError> {
        let raw = inner.borrow().engine()?.cursor();
        Ok(Cursor {
            inner,
            raw,
            mode,
        })
    }

    pub fn mode(&self) -> YieldMode {
        self.mode
    }

    pub fn is_exhausted(&self) -> bool {
        self.raw.is_exhausted()
    }

    /// Decode and step past the next entry.
    pub fn next_pair(&mut self) -> Result<Option<(Value, Value)>, StoreError> {
        if self.raw.is_exhausted() {
            return Ok(None);
        }
        let inner = self.inner.borrow();
        let engine = inner.engine()?;
        match self.raw.get(engine, true)? {
            Some((key, value)) => Ok(Some((inner.decode(&key)?, inner.decode(&value)?))),
            None => Ok(None),
        }
    }

    /// Step once, shaped by the cursor's mode.
    pub fn advance(&mut self) -> Result<Option<Yield>, StoreError> {
        let mode = self.mode;
        Ok(self.next_pair()?.map(|(key, value)| mode.shape(key, value)))
    }
}

impl Iterator for Cursor {
    type Item = Result<Yield, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}
