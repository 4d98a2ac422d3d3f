// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

pub mod cursor;
pub mod update;

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use log::{
    debug,
    error,
    warn,
};

use crate::backend::{
    self,
    BackendEngine,
    EngineKind,
};
use crate::codec::Codec;
use crate::error::StoreError;
use crate::options::StoreOptions;
use crate::value::Value;

use self::cursor::{
    Cursor,
    YieldMode,
};
use self::update::{
    split_pair,
    UpdateArgs,
    UpdateSource,
};

type EmptyResult = Result<(), StoreError>;

/// State shared between a `Store` and the cursors opened on it. The engine is
/// `None` once the store has been closed.
pub(crate) struct Inner {
    engine: Option<Box<dyn BackendEngine>>,
    codec: Box<dyn Codec>,
    options: StoreOptions,
}

impl Inner {
    pub(crate) fn engine(&self) -> Result<&dyn BackendEngine, StoreError> {
        self.engine.as_deref().ok_or(StoreError::ClosedError)
    }

    fn engine_mut(&mut self) -> Result<&mut Box<dyn BackendEngine>, StoreError> {
        self.engine.as_mut().ok_or(StoreError::ClosedError)
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, StoreError> {
        self.codec.encode(value).map_err(StoreError::EncodeError)
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Result<Value, StoreError> {
        self.codec.decode(bytes).map_err(StoreError::DecodeError)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            if let Err(e) = engine.close() {
                error!("Failed to close {:?}: {}", engine.path(), e);
            }
        }
    }
}

/// A dictionary-like view of one engine, with keys and values passed through
/// one codec.
///
/// Cursors opened on a store share it: dropping the `Store` while a cursor is
/// still alive keeps the engine open until the cursor is dropped too. An
/// explicit `close` shuts the engine at once, and every later call on the store
/// or its cursors fails with `StoreError::ClosedError`.
///
/// A store is confined to the thread that opened it.
pub struct Store {
    inner: Rc<RefCell<Inner>>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("options", &inner.options)
            .field("codec", &inner.codec.name())
            .field("closed", &inner.engine.is_none())
            .finish()
    }
}

/// Opening and closing.
impl Store {
    /// Open a store with the codec named in `options`.
    pub fn open(options: StoreOptions) -> Result<Store, StoreError> {
        let codec = options.codec.build();
        Store::from_parts(options, codec)
    }

    /// Open a store with a caller-supplied codec. `options.codec` is ignored.
    pub fn open_with_codec<C>(options: StoreOptions, codec: C) -> Result<Store, StoreError>
    where
        C: Codec + 'static,
    {
        Store::from_parts(options, Box::new(codec))
    }

    fn from_parts(options: StoreOptions, codec: Box<dyn Codec>) -> Result<Store, StoreError> {
        let engine = backend::open_engine(options.engine, &options.path, options.flags)
            .map_err(|e| StoreError::open(options.path.clone(), e))?;
        debug!("Opened {} store at {:?} with the {} codec", engine.kind(), engine.path(), codec.name());
        Ok(Store {
            inner: Rc::new(RefCell::new(Inner {
                engine: Some(engine),
                codec,
                options,
            })),
        })
    }

    /// Flush and release the engine. Closing twice is harmless.
    pub fn close(&mut self) -> EmptyResult {
        let mut inner = self.inner.borrow_mut();
        match inner.engine.take() {
            Some(mut engine) => {
                debug!("Closing {:?}", engine.path());
                engine.close()?;
            },
            None => warn!("Ignoring `close()` on a closed store at {:?}", inner.options.path),
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().engine.is_none()
    }

    /// Flush pending writes without closing.
    pub fn sync(&mut self) -> EmptyResult {
        let mut inner = self.inner.borrow_mut();
        Ok(inner.engine_mut()?.sync()?)
    }

    pub fn options(&self) -> StoreOptions {
        self.inner.borrow().options.clone()
    }

    /// The engine serving this store; for `Poly` stores, the one it picked.
    pub fn engine_kind(&self) -> Result<EngineKind, StoreError> {
        Ok(self.inner.borrow().engine()?.kind())
    }

    /// The canonical path for on-disk engines, the literal name otherwise.
    pub fn path(&self) -> Result<PathBuf, StoreError> {
        Ok(self.inner.borrow().engine()?.path().to_path_buf())
    }
}

/// The mapping protocol.
impl Store {
    pub fn get<K: Into<Value>>(&self, key: K) -> Result<Value, StoreError> {
        let key = key.into();
        let inner = self.inner.borrow();
        let engine = inner.engine()?;
        let bytes = inner.encode(&key)?;
        match engine.get(&bytes)? {
            Some(value) => inner.decode(&value),
            None => Err(StoreError::KeyNotFound(key)),
        }
    }

    /// Insert or overwrite. Both halves are encoded before the engine is touched.
    pub fn set<K, V>(&mut self, key: K, value: V) -> EmptyResult
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        self.put(&key.into(), &value.into())
    }

    fn put(&mut self, key: &Value, value: &Value) -> EmptyResult {
        let mut inner = self.inner.borrow_mut();
        inner.engine()?;
        let k = inner.encode(key)?;
        let v = inner.encode(value)?;
        Ok(inner.engine_mut()?.set(&k, &v)?)
    }

    /// Returns whether an entry existed.
    pub fn delete<K: Into<Value>>(&mut self, key: K) -> Result<bool, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.engine()?;
        let k = inner.encode(&key.into())?;
        Ok(inner.engine_mut()?.remove(&k)?)
    }

    pub fn contains<K: Into<Value>>(&self, key: K) -> Result<bool, StoreError> {
        let inner = self.inner.borrow();
        let engine = inner.engine()?;
        let k = inner.encode(&key.into())?;
        Ok(engine.check(&k)?.is_some())
    }

    /// The engine's live entry count.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.inner.borrow().engine()?.count()?)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Remove every entry, front to back. Not atomic: entries removed before a
    /// failure stay removed.
    pub fn clear(&mut self) -> EmptyResult {
        let mut inner = self.inner.borrow_mut();
        let engine = inner.engine_mut()?;
        let mut cursor = engine.cursor();
        let mut removed = 0usize;
        while cursor.remove(&mut **engine)? {
            removed += 1;
        }
        debug!("Cleared {} entries from {:?}", removed, engine.path());
        Ok(())
    }

    /// Fetch and remove in a single engine call.
    pub fn pop<K: Into<Value>>(&mut self, key: K) -> Result<Value, StoreError> {
        let key = key.into();
        match self.seize(&key)? {
            Some(value) => Ok(value),
            None => Err(StoreError::KeyNotFound(key)),
        }
    }

    /// Like `pop`, but a missing key yields `default` instead of an error.
    pub fn pop_or<K, D>(&mut self, key: K, default: D) -> Result<Value, StoreError>
    where
        K: Into<Value>,
        D: Into<Value>,
    {
        Ok(self.seize(&key.into())?.unwrap_or_else(|| default.into()))
    }

    fn seize(&mut self, key: &Value) -> Result<Option<Value>, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.engine()?;
        let k = inner.encode(key)?;
        let seized = inner.engine_mut()?.seize(&k)?;
        match seized {
            Some(bytes) => inner.decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Merge at most one positional source, then the named overrides, in that
    /// order. Stops at the first failure; earlier writes are kept.
    pub fn update(&mut self, args: UpdateArgs) -> EmptyResult {
        let UpdateArgs {
            mut sources,
            named,
        } = args;
        if sources.len() > 1 {
            return Err(StoreError::ArgumentError(format!(
                "update expected at most 1 positional source, got {}",
                sources.len()
            )));
        }

        let mut written = 0usize;
        match sources.pop() {
            Some(UpdateSource::Mapping(mapping)) => {
                for key in mapping.source_keys()? {
                    let value = mapping.lookup(&key)?;
                    self.put(&key, &value)?;
                    written += 1;
                }
            },
            Some(UpdateSource::Pairs(pairs)) => {
                for (i, element) in pairs.enumerate() {
                    let (key, value) = split_pair(i, element)?;
                    self.put(&key, &value)?;
                    written += 1;
                }
            },
            None => (),
        }

        for (name, value) in named {
            let key = self.inner.borrow().codec.key_from_name(&name);
            self.put(&key, &value)?;
            written += 1;
        }
        debug!("Updated {} entries", written);
        Ok(())
    }
}

/// Cursors and bulk enumeration.
impl Store {
    pub fn cursor(&self, mode: YieldMode) -> Result<Cursor, StoreError> {
        Cursor::new(Rc::clone(&self.inner), mode)
    }

    pub fn iter(&self) -> Result<Cursor, StoreError> {
        self.iter_keys()
    }

    pub fn iter_keys(&self) -> Result<Cursor, StoreError> {
        self.cursor(YieldMode::Key)
    }

    pub fn iter_values(&self) -> Result<Cursor, StoreError> {
        self.cursor(YieldMode::Value)
    }

    pub fn iter_items(&self) -> Result<Cursor, StoreError> {
        self.cursor(YieldMode::Pair)
    }

    pub fn keys(&self) -> Result<Vec<Value>, StoreError> {
        self.scan(|key, _| key)
    }

    pub fn values(&self) -> Result<Vec<Value>, StoreError> {
        self.scan(|_, value| value)
    }

    pub fn items(&self) -> Result<Vec<(Value, Value)>, StoreError> {
        self.scan(|key, value| (key, value))
    }

    /// One full scan, sized from the entry count when it starts. On failure the
    /// partial result is dropped.
    fn scan<T, F>(&self, mut shape: F) -> Result<Vec<T>, StoreError>
    where
        F: FnMut(Value, Value) -> T,
    {
        let mut cursor = self.cursor(YieldMode::Pair)?;
        let mut out = Vec::with_capacity(self.len()?);
        while let Some((key, value)) = cursor.next_pair()? {
            out.push(shape(key, value));
        }
        Ok(out)
    }
}
