// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use super::{
    BackendEngine,
    ErrorImpl,
    Record,
};

/// A native cursor. It remembers the last key it stepped over rather than
/// borrowing the engine, so the engine stays free to be mutated between steps;
/// what the cursor sees after such a mutation is up to the engine's ordering.
#[derive(Debug, Default, Clone)]
pub struct RawCursor {
    last: Option<Vec<u8>>,
    exhausted: bool,
}

impl RawCursor {
    pub fn new() -> RawCursor {
        RawCursor::default()
    }

    /// Go back to the first record.
    pub fn jump(&mut self) {
        self.last = None;
        self.exhausted = false;
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Return the current record, moving past it if `step` is set. Once the
    /// engine runs out of records the cursor stays exhausted until `jump`.
    pub fn get(&mut self, engine: &dyn BackendEngine, step: bool) -> Result<Option<Record>, ErrorImpl> {
        if self.exhausted {
            return Ok(None);
        }
        match engine.next_after(self.last.as_deref())? {
            Some((key, value)) => {
                if step {
                    self.last = Some(key.clone());
                }
                Ok(Some((key, value)))
            },
            None => {
                self.exhausted = true;
                Ok(None)
            },
        }
    }

    /// Remove the current record; the cursor then stands on its successor.
    /// Returns `false` once there is nothing left to remove.
    pub fn remove(&mut self, engine: &mut dyn BackendEngine) -> Result<bool, ErrorImpl> {
        if self.exhausted {
            return Ok(false);
        }
        match engine.next_after(self.last.as_deref())? {
            Some((key, _)) => {
                engine.remove(&key)?;
                // Every engine can seek past a key that no longer exists.
                self.last = Some(key);
                Ok(true)
            },
            None => {
                self.exhausted = true;
                Ok(false)
            },
        }
    }
}
