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

//! The single active GPU backend of a host, together with the support
//! library its code lives in.

use std::path::{Path, PathBuf};

use crate::dynlib::OpiCDynamicLibrary;
use crate::errors::{OpiError, Result};
use crate::gpu::support::{
    OpiCGpuPlatform, OpiCGpuSupport, OpiFCreateGpuSupport, OPI_GPU_SUPPORT_FACTORY_SYMBOL,
};

/// Owns a backend and, when it came from a support library, that library.
///
/// Field order matters: `support` is dropped before `library`, so the
/// backend's code is still mapped while its destructor runs.
pub struct OpiCGpuBackend {
    support: Box<dyn OpiCGpuSupport>,
    library: Option<OpiCDynamicLibrary>,
    initialized: bool,
}

impl std::fmt::Debug for OpiCGpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpiCGpuBackend")
            .field("platform", &self.support.platform())
            .field("library", &self.library.as_ref().map(|l| l.OpiFPath().to_path_buf()))
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl OpiCGpuBackend {
    /// Wraps a backend linked into the application.
    #[allow(non_snake_case)]
    pub fn OpiFFromSupport(support: Box<dyn OpiCGpuSupport>) -> Self {
        OpiCGpuBackend {
            support,
            library: None,
            initialized: false,
        }
    }

    /// `<plugin_dir>/support/OPI-cuda<suffix>` or `.../OPI-cl<suffix>`.
    #[allow(non_snake_case)]
    pub fn OpiFSupportLibraryPath(plugin_dir: &Path, platform: OpiCGpuPlatform) -> Option<PathBuf> {
        platform.OpiFSupportLibraryName().map(|name| {
            plugin_dir.join("support").join(format!(
                "{}{}",
                name,
                OpiCDynamicLibrary::OpiFPlatformSuffix()
            ))
        })
    }

    /// Loads the support library for `platform` and constructs its backend.
    ///
    /// The library is opened with its symbols exposed to libraries loaded
    /// later, so plugins share the backend's types.
    #[allow(non_snake_case)]
    pub fn OpiFLoad(plugin_dir: &Path, platform: OpiCGpuPlatform) -> Result<Self> {
        let path = Self::OpiFSupportLibraryPath(plugin_dir, platform)
            .ok_or_else(|| OpiError::config("no support library exists for platform 'none'"))?;

        log::info!(
            "opi.gpu.load: loading support library - platform={}, path={}",
            platform,
            path.display()
        );

        let library = OpiCDynamicLibrary::OpiFOpen(&path, true)?;
        let create = library
            .OpiFSymbol(OPI_GPU_SUPPORT_FACTORY_SYMBOL)
            .ok_or_else(|| OpiError::missing_symbol(path.to_string_lossy(), OPI_GPU_SUPPORT_FACTORY_SYMBOL))?;

        // SAFETY: support libraries export `createGpuSupport` with this
        // signature; ownership of the returned box passes to the host.
        let support = unsafe {
            let create: OpiFCreateGpuSupport = create.OpiFCast();
            let raw = create();
            if raw.is_null() {
                return Err(OpiError::malformed(
                    path.to_string_lossy(),
                    "createGpuSupport returned null",
                ));
            }
            *Box::from_raw(raw)
        };

        Ok(OpiCGpuBackend {
            support,
            library: Some(library),
            initialized: false,
        })
    }

    #[allow(non_snake_case)]
    pub fn OpiFInit(&mut self) -> crate::errors::OpiCErrorCode {
        let code = self.support.init();
        self.initialized = code.OpiFIsSuccess();
        code
    }

    #[allow(non_snake_case)]
    pub fn OpiFPlatform(&self) -> OpiCGpuPlatform {
        self.support.platform()
    }

    #[allow(non_snake_case)]
    pub fn OpiFSupport(&self) -> &dyn OpiCGpuSupport {
        self.support.as_ref()
    }

    #[allow(non_snake_case)]
    pub fn OpiFSupportMut(&mut self) -> &mut dyn OpiCGpuSupport {
        self.support.as_mut()
    }

    /// Shuts the backend down, destroys it and then unloads its library.
    #[allow(non_snake_case)]
    pub fn OpiFShutdown(self) {
        let OpiCGpuBackend {
            mut support,
            library,
            initialized,
        } = self;

        let platform = support.platform();
        if initialized {
            support.shutdown();
        }
        drop(support);
        log::info!("opi.gpu.shutdown: GPU backend destroyed - platform={}", platform);

        if let Some(library) = library {
            library.OpiFClose();
        }
    }
}
