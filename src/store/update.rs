// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::collections::{
    BTreeMap,
    HashMap,
};
use std::convert::TryInto;
use std::hash::BuildHasher;

use crate::error::StoreError;
use crate::store::Store;
use crate::value::Value;

/// Anything `Store::update` can read as a mapping: it lists its keys once, then
/// each key is looked up on its own.
pub trait MappingSource {
    fn source_keys(&self) -> Result<Vec<Value>, StoreError>;

    fn lookup(&self, key: &Value) -> Result<Value, StoreError>;
}

impl MappingSource for BTreeMap<Value, Value> {
    fn source_keys(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.keys().cloned().collect())
    }

    fn lookup(&self, key: &Value) -> Result<Value, StoreError> {
        self.get(key).cloned().ok_or_else(|| StoreError::KeyNotFound(key.clone()))
    }
}

impl<S: BuildHasher> MappingSource for HashMap<Value, Value, S> {
    fn source_keys(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.keys().cloned().collect())
    }

    fn lookup(&self, key: &Value) -> Result<Value, StoreError> {
        self.get(key).cloned().ok_or_else(|| StoreError::KeyNotFound(key.clone()))
    }
}

impl MappingSource for Store {
    fn source_keys(&self) -> Result<Vec<Value>, StoreError> {
        self.keys()
    }

    fn lookup(&self, key: &Value) -> Result<Value, StoreError> {
        self.get(key)
    }
}

pub enum UpdateSource<'a> {
    Mapping(&'a dyn MappingSource),
    /// Each element must itself be a two-element `Value::List`.
    Pairs(Box<dyn Iterator<Item = Value> + 'a>),
}

impl<'a> UpdateSource<'a> {
    pub fn mapping(source: &'a dyn MappingSource) -> UpdateSource<'a> {
        UpdateSource::Mapping(source)
    }

    pub fn pairs<I>(pairs: I) -> UpdateSource<'a>
    where
        I: IntoIterator,
        I::Item: Into<Value> + 'a,
        I::IntoIter: 'a,
    {
        UpdateSource::Pairs(Box::new(pairs.into_iter().map(Into::into)))
    }
}

/// The arguments to `Store::update`.
///
/// ```
/// use kabinet::{Store, StoreOptions, UpdateArgs, UpdateSource};
///
/// let mut store = Store::open(StoreOptions::in_memory()).unwrap();
/// let args = UpdateArgs::new()
///     .source(UpdateSource::pairs(vec![("a", 1), ("b", 2)]))
///     .named("c", 3);
/// store.update(args).unwrap();
/// assert_eq!(store.len().unwrap(), 3);
/// ```
#[derive(Default)]
pub struct UpdateArgs<'a> {
    pub sources: Vec<UpdateSource<'a>>,
    pub named: Vec<(String, Value)>,
}

impl<'a> UpdateArgs<'a> {
    pub fn new() -> UpdateArgs<'a> {
        UpdateArgs::default()
    }

    pub fn source(mut self, source: UpdateSource<'a>) -> UpdateArgs<'a> {
        self.sources.push(source);
        self
    }

    pub fn named<N, V>(mut self, name: N, value: V) -> UpdateArgs<'a>
    where
        N: Into<String>,
        V: Into<Value>,
    {
        self.named.push((name.into(), value.into()));
        self
    }
}

/// Split the `i`th element of a pair sequence into its key and value.
pub(crate) fn split_pair(i: usize, element: Value) -> Result<(Value, Value), StoreError> {
    let items = match element {
        Value::List(items) => items,
        _ => {
            return Err(StoreError::ArgumentError(format!(
                "cannot convert update sequence element #{} to a sequence",
                i
            )))
        },
    };
    let [key, value]: [Value; 2] = items.try_into().map_err(|items: Vec<Value>| {
        StoreError::ArgumentError(format!("update sequence element #{} has length {}; 2 is required", i, items.len()))
    })?;
    Ok((key, value))
}
