//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Opix.
//! The Opix project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Where plugin symbols come from.
//!
//! Descriptors resolve everything through [`OpiCPluginSource`]. A shared
//! library found on disk is one source; a plugin linked statically into
//! the application is another, built with [`OpiCStaticPluginSource`] from
//! the addresses of its exported functions. Dropping a source releases the
//! code behind it.

use std::collections::HashMap;
use std::ffi::c_void;
use std::path::{Path, PathBuf};

use crate::dynlib::{OpiCDynamicLibrary, OpiCRawSymbol};

pub trait OpiCPluginSource {
    /// File the plugin was loaded from, or a label for in-process sources.
    fn path(&self) -> &Path;

    fn symbol(&self, name: &str) -> Option<OpiCRawSymbol>;
}

impl OpiCPluginSource for OpiCDynamicLibrary {
    fn path(&self) -> &Path {
        self.OpiFPath()
    }

    fn symbol(&self, name: &str) -> Option<OpiCRawSymbol> {
        self.OpiFSymbol(name)
    }
}

/// Symbol table of a plugin compiled into the application.
#[derive(Clone, Debug)]
pub struct OpiCStaticPluginSource {
    label: PathBuf,
    symbols: HashMap<String, OpiCRawSymbol>,
}

impl OpiCStaticPluginSource {
    #[allow(non_snake_case)]
    pub fn OpiFNew(label: impl Into<PathBuf>) -> Self {
        OpiCStaticPluginSource {
            label: label.into(),
            symbols: HashMap::new(),
        }
    }

    /// Registers `address` under `name`. Null addresses are ignored.
    ///
    /// Functions are passed as `my_fn as *const c_void`; the caller is
    /// responsible for the signature matching what the host expects under
    /// that name.
    #[allow(non_snake_case)]
    pub fn OpiFWithSymbol(mut self, name: &str, address: *const c_void) -> Self {
        match OpiCRawSymbol::OpiFNew(address) {
            Some(symbol) => {
                self.symbols.insert(name.to_string(), symbol);
            }
            None => log::warn!(
                "opi.plugin.static_symbol_null: ignoring null symbol - source={}, symbol={}",
                self.label.display(),
                name
            ),
        }
        self
    }
}

impl OpiCPluginSource for OpiCStaticPluginSource {
    fn path(&self) -> &Path {
        &self.label
    }

    fn symbol(&self, name: &str) -> Option<OpiCRawSymbol> {
        self.symbols.get(name).copied()
    }
}
