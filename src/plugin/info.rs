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

//! # Plugin Metadata ABI
//!
//! Every plugin exports `OPI_Plugin_info`, which fills an
//! [`OpiCPluginInfoFfi`] record supplied by the host. The call happens
//! before any plugin object exists, so the host can gate a plugin without
//! running its constructors.
//!
//! Strings are fixed-size, NUL-terminated buffers. A buffer without a NUL
//! is read up to its full length; invalid UTF-8 is replaced.

use std::os::raw::{c_char, c_int};

use serde::{Deserialize, Serialize};

use crate::plugin::category::OpiCPluginCategory;
use crate::version::OpiCVersion;

pub const OPI_PLUGIN_INFO_SYMBOL: &str = "OPI_Plugin_info";

pub const OPI_PLUGIN_NAME_LEN: usize = 128;
pub const OPI_PLUGIN_AUTHOR_LEN: usize = 128;
pub const OPI_PLUGIN_DESCRIPTION_LEN: usize = 512;

/// Signature of [`OPI_PLUGIN_INFO_SYMBOL`].
pub type OpiFPluginInfo = unsafe extern "C" fn(info: *mut OpiCPluginInfoFfi);

/// Metadata record filled in by the plugin.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct OpiCPluginInfoFfi {
    pub category: c_int,
    pub name: [c_char; OPI_PLUGIN_NAME_LEN],
    pub author: [c_char; OPI_PLUGIN_AUTHOR_LEN],
    pub description: [c_char; OPI_PLUGIN_DESCRIPTION_LEN],
    pub version_major: c_int,
    pub version_minor: c_int,
    pub version_patch: c_int,
    pub min_host_major: c_int,
    pub min_host_minor: c_int,
    pub min_host_patch: c_int,
    /// Non-zero when the plugin exports a native-object constructor
    /// instead of a function table.
    pub native_factory: c_int,
    /// Minimum CUDA compute capability, 0 or less when CUDA is not needed.
    pub requires_cuda: c_int,
    /// Minimum OpenCL version, 0 or less when OpenCL is not needed.
    pub requires_opencl: c_int,
}

impl Default for OpiCPluginInfoFfi {
    fn default() -> Self {
        OpiCPluginInfoFfi {
            category: 0,
            name: [0; OPI_PLUGIN_NAME_LEN],
            author: [0; OPI_PLUGIN_AUTHOR_LEN],
            description: [0; OPI_PLUGIN_DESCRIPTION_LEN],
            version_major: 0,
            version_minor: 0,
            version_patch: 0,
            min_host_major: 0,
            min_host_minor: 0,
            min_host_patch: 0,
            native_factory: 0,
            requires_cuda: 0,
            requires_opencl: 0,
        }
    }
}

impl OpiCPluginInfoFfi {
    /// Helpers for plugins written in Rust. Text longer than the buffer is
    /// truncated so the terminating NUL always fits.
    #[allow(non_snake_case)]
    pub fn OpiFSetName(&mut self, name: &str) {
        write_c_string(&mut self.name, name);
    }

    #[allow(non_snake_case)]
    pub fn OpiFSetAuthor(&mut self, author: &str) {
        write_c_string(&mut self.author, author);
    }

    #[allow(non_snake_case)]
    pub fn OpiFSetDescription(&mut self, description: &str) {
        write_c_string(&mut self.description, description);
    }

    #[allow(non_snake_case)]
    pub fn OpiFSetVersion(&mut self, version: OpiCVersion) {
        self.version_major = version.major as c_int;
        self.version_minor = version.minor as c_int;
        self.version_patch = version.patch as c_int;
    }

    #[allow(non_snake_case)]
    pub fn OpiFSetMinHostVersion(&mut self, version: OpiCVersion) {
        self.min_host_major = version.major as c_int;
        self.min_host_minor = version.minor as c_int;
        self.min_host_patch = version.patch as c_int;
    }
}

fn write_c_string(dst: &mut [c_char], text: &str) {
    dst.iter_mut().for_each(|c| *c = 0);
    let limit = dst.len().saturating_sub(1);
    for (slot, byte) in dst.iter_mut().zip(text.bytes().take(limit)) {
        *slot = byte as c_char;
    }
}

fn read_c_string(src: &[c_char]) -> String {
    let bytes: Vec<u8> = src
        .iter()
        .map(|&c| c as u8)
        .take_while(|&b| b != 0)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// GPU capabilities a plugin needs. Non-positive values mean "not needed".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpiCGpuRequirements {
    pub cuda: i32,
    pub opencl: i32,
}

impl OpiCGpuRequirements {
    #[allow(non_snake_case)]
    pub fn OpiFNeedsCuda(&self) -> bool {
        self.cuda > 0
    }

    #[allow(non_snake_case)]
    pub fn OpiFNeedsOpenCl(&self) -> bool {
        self.opencl > 0
    }

    #[allow(non_snake_case)]
    pub fn OpiFNeedsGpu(&self) -> bool {
        self.OpiFNeedsCuda() || self.OpiFNeedsOpenCl()
    }
}

/// Decoded plugin metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpiCPluginInfo {
    pub category: OpiCPluginCategory,
    pub name: String,
    pub author: String,
    pub description: String,
    pub version: OpiCVersion,
    pub min_host_version: OpiCVersion,
    pub native_factory: bool,
    pub requirements: OpiCGpuRequirements,
}

impl OpiCPluginInfo {
    /// Placeholder used for descriptors whose metadata could not be read.
    #[allow(non_snake_case)]
    pub fn OpiFUnknown(name: impl Into<String>) -> Self {
        OpiCPluginInfo {
            category: OpiCPluginCategory::Unknown(0),
            name: name.into(),
            author: String::new(),
            description: String::new(),
            version: OpiCVersion::default(),
            min_host_version: OpiCVersion::default(),
            native_factory: false,
            requirements: OpiCGpuRequirements::default(),
        }
    }
}

impl From<&OpiCPluginInfoFfi> for OpiCPluginInfo {
    fn from(raw: &OpiCPluginInfoFfi) -> Self {
        OpiCPluginInfo {
            category: OpiCPluginCategory::OpiFFromRaw(raw.category),
            name: read_c_string(&raw.name),
            author: read_c_string(&raw.author),
            description: read_c_string(&raw.description),
            version: OpiCVersion::OpiFFromRaw(raw.version_major, raw.version_minor, raw.version_patch),
            min_host_version: OpiCVersion::OpiFFromRaw(
                raw.min_host_major,
                raw.min_host_minor,
                raw.min_host_patch,
            ),
            native_factory: raw.native_factory != 0,
            requirements: OpiCGpuRequirements {
                cuda: raw.requires_cuda,
                opencl: raw.requires_opencl,
            },
        }
    }
}
