// Copyright 2018-2019 Mozilla
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use
// this file except in compliance with the License. You may obtain a copy of the
// License at http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software distributed
// under the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR
// CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

//! Print every entry of a store, one `key<TAB>value` line per entry.
//!
//!     dump [-e ENGINE] [-r] PATH
//!
//! `-e` picks the engine (default: poly). `-r` reads with the raw codec, which
//! prints keys and values as escaped byte strings.

use std::env::args;
use std::io::{
    self,
    Write,
};
use std::process;

use kabinet::{
    CodecKind,
    EngineKind,
    Store,
    StoreOptions,
};

fn main() {
    let mut args = args();
    let mut engine = EngineKind::default();
    let mut codec = CodecKind::Object;
    let mut path = None;

    // The first arg is the name of the program, which we can ignore.
    args.next();

    while let Some(arg) = args.next() {
        if arg.starts_with('-') {
            match &arg[1..] {
                "e" => {
                    engine = match args.next() {
                        None => panic!("-e must be followed by an engine name"),
                        Some(name) => name.parse().unwrap_or_else(|e| panic!("{}", e)),
                    };
                },
                "r" => codec = CodecKind::Raw,
                str => panic!("arg -{} not recognized", str),
            }
        } else {
            if path.is_some() {
                panic!("must provide only one path to the store");
            }
            path = Some(arg);
        }
    }

    let path = match path {
        Some(path) => path,
        None => panic!("must provide a path to the store"),
    };

    let options = StoreOptions::new(&path).engine(engine).codec(codec).read_only();
    let store = match Store::open(options) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        },
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut cursor = store.iter_items().expect("cursor");
    while let Some((key, value)) = cursor.next_pair().expect("read entry") {
        writeln!(out, "{}\t{}", key, value).expect("written");
    }
}
