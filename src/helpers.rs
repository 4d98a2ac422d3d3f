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
use std::path::{
    Path,
    PathBuf,
};

#[cfg(not(feature = "no-canonicalize-path"))]
pub(crate) fn canonicalize_path(path: &Path) -> io::Result<PathBuf> {
    path.canonicalize()
}

#[cfg(feature = "no-canonicalize-path")]
pub(crate) fn canonicalize_path(path: &Path) -> io::Result<PathBuf> {
    Ok(path.to_path_buf())
}
