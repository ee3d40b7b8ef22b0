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

//! # Dynamic Library Module
//!
//! Cross-platform wrapper over the OS dynamic loader. Everything that is
//! platform specific (loader flags, the shared-library suffix) stays in this
//! file.
//!
//! Failing to open a file is an ordinary outcome while scanning a plugin
//! directory, so [`OpiCDynamicLibrary::OpiFOpen`] reports it as an
//! `OpiError::Library` value and never panics.
//!
//! ## Symbol visibility
//!
//! GPU support libraries are opened with `expose_symbols = true`
//! (`RTLD_GLOBAL` on Unix) so that plugins loaded afterwards resolve the
//! backend's types against the same copy of the code. Ordinary plugins are
//! opened with local visibility. Windows resolves imports per module and
//! ignores the flag.

use std::ffi::c_void;
use std::mem;
use std::path::{Path, PathBuf};

use libloading::Library;

use crate::errors::{OpiError, Result};

/// Address of an exported symbol, not yet given a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpiCRawSymbol(*const c_void);

impl OpiCRawSymbol {
    /// Wraps an address, rejecting null.
    #[allow(non_snake_case)]
    pub fn OpiFNew(address: *const c_void) -> Option<Self> {
        if address.is_null() {
            None
        } else {
            Some(OpiCRawSymbol(address))
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFAddress(self) -> *const c_void {
        self.0
    }

    /// Reinterprets the address as a function or data pointer type.
    ///
    /// # Safety
    ///
    /// `T` must be a pointer-sized type that matches what the library
    /// actually exports under this symbol's name.
    #[allow(non_snake_case)]
    pub unsafe fn OpiFCast<T: Copy>(self) -> T {
        assert_eq!(
            mem::size_of::<T>(),
            mem::size_of::<*const c_void>(),
            "symbols can only be cast to pointer-sized types"
        );
        mem::transmute_copy::<*const c_void, T>(&self.0)
    }
}

/// An open shared library. Dropping it unloads the library; every object
/// created from its code must be gone by then.
#[derive(Debug)]
pub struct OpiCDynamicLibrary {
    path: PathBuf,
    exposes_symbols: bool,
    library: Library,
}

impl OpiCDynamicLibrary {
    /// Opens the library at `path`.
    #[allow(non_snake_case)]
    pub fn OpiFOpen(path: &Path, expose_symbols: bool) -> Result<Self> {
        if !path.is_file() {
            return Err(OpiError::library(
                path.to_string_lossy(),
                "no such file",
            ));
        }

        let library = open_platform_library(path, expose_symbols).map_err(|e| match e {
            OpiError::Library { message, .. } => OpiError::library(path.to_string_lossy(), message),
            other => other,
        })?;

        log::debug!(
            "opi.dynlib.open: library loaded - path={}, expose_symbols={}",
            path.display(),
            expose_symbols
        );

        Ok(OpiCDynamicLibrary {
            path: path.to_path_buf(),
            exposes_symbols: expose_symbols,
            library,
        })
    }

    /// Looks up an exported symbol by its unmangled name.
    #[allow(non_snake_case)]
    pub fn OpiFSymbol(&self, name: &str) -> Option<OpiCRawSymbol> {
        // SAFETY: the symbol is only read as an address here; giving it a
        // type is the caller's responsibility (`OpiCRawSymbol::OpiFCast`).
        let symbol = unsafe { self.library.get::<*const c_void>(name.as_bytes()) };
        match symbol {
            Ok(symbol) => OpiCRawSymbol::OpiFNew(*symbol),
            Err(e) => {
                log::debug!(
                    "opi.dynlib.symbol_missing: symbol not exported - path={}, symbol={}, error={}",
                    self.path.display(),
                    name,
                    e
                );
                None
            }
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFPath(&self) -> &Path {
        &self.path
    }

    #[allow(non_snake_case)]
    pub fn OpiFExposesSymbols(&self) -> bool {
        self.exposes_symbols
    }

    /// Unloads the library, logging loader errors instead of returning them.
    #[allow(non_snake_case)]
    pub fn OpiFClose(self) {
        let path = self.path;
        match self.library.close() {
            Ok(()) => log::debug!("opi.dynlib.close: library unloaded - path={}", path.display()),
            Err(e) => log::warn!(
                "opi.dynlib.close_failed: loader reported an error on unload - path={}, error={}",
                path.display(),
                e
            ),
        }
    }

    /// File suffix of shared libraries on this platform, including the dot.
    #[allow(non_snake_case)]
    pub fn OpiFPlatformSuffix() -> &'static str {
        std::env::consts::DLL_SUFFIX
    }
}

#[cfg(unix)]
fn open_platform_library(path: &Path, expose_symbols: bool) -> Result<Library> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_LOCAL, RTLD_NOW};

    let visibility = if expose_symbols { RTLD_GLOBAL } else { RTLD_LOCAL };
    // SAFETY: running a library's initializers is inherent to loading
    // plugins; the host only loads files from the configured plugin folder.
    let library = unsafe { UnixLibrary::open(Some(path), RTLD_NOW | visibility)? };
    Ok(library.into())
}

#[cfg(not(unix))]
fn open_platform_library(path: &Path, _expose_symbols: bool) -> Result<Library> {
    // SAFETY: see the Unix variant.
    let library = unsafe { Library::new(path)? };
    Ok(library)
}
