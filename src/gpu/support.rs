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

//! # GPU Support Facade
//!
//! The capability set every compute backend implements. The host and the
//! plugins only ever see `dyn OpiCGpuSupport`; the CUDA and OpenCL
//! implementations live in their own support libraries.
//!
//! ## Backend-native handles
//!
//! Queues, streams and contexts are not part of the facade. A plugin that
//! needs them downcasts with [`OpiFDowncastGpuSupport`], naming the platform
//! it declared in its metadata. The compatibility gate guarantees that such
//! a plugin is only registered when that platform is active, and the
//! downcast re-checks the platform tag before touching the concrete type.
//!
//! ## Synchronization
//!
//! Work submitted to a backend runs asynchronously. Nothing in the facade
//! waits implicitly; callers reading results back call `synchronize` first.

use std::any::Any;
use std::ffi::c_void;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{OpiCErrorCode, OpiError};

/// Name of the constructor every support library exports.
pub const OPI_GPU_SUPPORT_FACTORY_SYMBOL: &str = "createGpuSupport";

/// Compute platform requested by the application or provided by a backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpiCGpuPlatform {
    #[default]
    None,
    Cuda,
    #[serde(rename = "opencl", alias = "cl")]
    OpenCl,
}

impl OpiCGpuPlatform {
    /// Base name of the support library inside `<plugindir>/support/`.
    #[allow(non_snake_case)]
    pub fn OpiFSupportLibraryName(self) -> Option<&'static str> {
        match self {
            OpiCGpuPlatform::None => None,
            OpiCGpuPlatform::Cuda => Some("OPI-cuda"),
            OpiCGpuPlatform::OpenCl => Some("OPI-cl"),
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFFrameworkName(self) -> &'static str {
        match self {
            OpiCGpuPlatform::None => "none",
            OpiCGpuPlatform::Cuda => "CUDA",
            OpiCGpuPlatform::OpenCl => "OpenCL",
        }
    }
}

impl fmt::Display for OpiCGpuPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.OpiFFrameworkName())
    }
}

impl FromStr for OpiCGpuPlatform {
    type Err = OpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(OpiCGpuPlatform::None),
            "cuda" => Ok(OpiCGpuPlatform::Cuda),
            "opencl" | "cl" => Ok(OpiCGpuPlatform::OpenCl),
            other => Err(OpiError::config(format!("unknown GPU platform '{}'", other))),
        }
    }
}

/// Direction of a host/device memory copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpiCCopyDirection {
    HostToDevice,
    DeviceToHost,
}

/// Opaque device allocation returned by a backend. Null means the
/// allocation failed or no backend was active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpiCDevicePtr(pub *mut c_void);

impl OpiCDevicePtr {
    #[allow(non_snake_case)]
    pub fn OpiFNull() -> Self {
        OpiCDevicePtr(std::ptr::null_mut())
    }

    #[allow(non_snake_case)]
    pub fn OpiFIsNull(self) -> bool {
        self.0.is_null()
    }
}

/// Backend-neutral description of one compute device.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpiCDeviceProperties {
    pub name: String,
    /// Compute capability for CUDA, major OpenCL version otherwise.
    pub capability_major: i32,
    pub capability_minor: i32,
    pub total_memory_bytes: u64,
    pub multiprocessor_count: i32,
    pub max_threads_per_block: i32,
    pub clock_rate_khz: i32,
}

pub trait OpiCGpuSupport: Any {
    /// Platform this backend drives. Used to guard every downcast.
    fn platform(&self) -> OpiCGpuPlatform;

    /// Creates contexts and selects the default device.
    fn init(&mut self) -> OpiCErrorCode;

    fn shutdown(&mut self);

    fn select_device(&mut self, device: i32);

    fn current_device(&self) -> i32;

    fn device_count(&self) -> i32;

    fn current_device_name(&self) -> String;

    /// Major compute capability of the selected device, 0 if unknown.
    fn current_device_capability(&self) -> i32;

    fn device_properties(&self, device: i32) -> Option<OpiCDeviceProperties>;

    fn allocate(&self, size: usize) -> OpiCDevicePtr;

    fn free(&self, ptr: OpiCDevicePtr);

    /// Copies `size` bytes between host and device memory.
    ///
    /// # Safety
    ///
    /// `dst` and `src` must be valid for `size` bytes on the side of the
    /// transfer named by `direction`.
    unsafe fn copy(&self, dst: *mut c_void, src: *const c_void, size: usize, direction: OpiCCopyDirection);

    /// Blocks until all work queued on the selected device has finished.
    fn synchronize(&self) {}

    fn as_any(&self) -> &dyn Any;
}

/// Thin-pointer box returned across the support library boundary.
pub type OpiCGpuSupportBox = Box<dyn OpiCGpuSupport>;

/// Signature of [`OPI_GPU_SUPPORT_FACTORY_SYMBOL`].
pub type OpiFCreateGpuSupport = unsafe extern "C" fn() -> *mut OpiCGpuSupportBox;

/// Reaches the concrete backend type behind the facade.
///
/// Returns `None` unless the backend reports `platform` and really is a `T`.
#[allow(non_snake_case)]
pub fn OpiFDowncastGpuSupport<T: OpiCGpuSupport>(
    support: &dyn OpiCGpuSupport,
    platform: OpiCGpuPlatform,
) -> Option<&T> {
    if support.platform() != platform {
        log::warn!(
            "opi.gpu.downcast_denied: backend platform does not match - expected={}, active={}",
            platform,
            support.platform()
        );
        return None;
    }
    support.as_any().downcast_ref::<T>()
}
