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

//! # Opix
//!
//! Plugin host for orbital propagation. Third-party shared libraries
//! implement propagators, distance queries and collision detectors; Opix
//! finds them, checks that they can run against this host and the active
//! GPU backend, creates their objects and owns them until shutdown.
//!
//! ## Module Overview
//!
//! - **errors**: `OpiError` for internal failures, `OpiCErrorCode` for the
//!   host-level error channel shared with plugins
//! - **version**: host ABI version and version triples
//! - **config**: host configuration (plugin directory, platform, device, logging)
//! - **log**: `log` backend with console and file output
//! - **dynlib**: cross-platform shared library loading
//! - **gpu**: the GPU support facade and the backend holder
//! - **plugin**: metadata ABI, descriptors, compatibility gate, function
//!   tables and the factory
//! - **module**: the traits registered objects implement, plus the custom
//!   propagator composed from perturbation modules and an integrator
//! - **population**: the object data passed to propagators and queries
//! - **host**: registries, loading, the error channel and ordered teardown
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use opix::{OpiCErrorCode, OpiCGpuPlatform, OpiCHost, OpiCPopulation};
//!
//! let mut host = OpiCHost::OpiFNew();
//! host.OpiFSetErrorCallback(|id, code| eprintln!("{}: {}", id, code));
//!
//! if host.OpiFLoadPlugins("plugins", OpiCGpuPlatform::OpenCl) == OpiCErrorCode::Success {
//!     let mut population = OpiCPopulation::OpiFNew(1000);
//!     if let Some(propagator) = host.OpiFGetPropagatorAtMut(0) {
//!         propagator.propagate(&mut population, 2_451_545.0, 60.0);
//!     }
//! }
//! ```
//!
//! ## Writing Plugins
//!
//! A plugin is a `cdylib` exporting `OPI_Plugin_info` and either a native
//! constructor (`OPI_Plugin_createPropagator` and friends, returning a
//! boxed trait object) or a function table (`OPI_Plugin_getPropagatorTable`
//! and friends). Rust plugins depend on this crate for the traits; plugins
//! in other languages only need the `#[repr(C)]` records in
//! [`plugin::info`] and [`plugin::table`].

#![allow(non_snake_case)]

pub mod config;
pub mod dynlib;
pub mod errors;
pub mod gpu;
pub mod host;
pub mod log;
pub mod module;
pub mod plugin;
pub mod population;
pub mod version;

pub use config::{OpiCHostConfig, OpiCHostConfigBuilder};
pub use dynlib::{OpiCDynamicLibrary, OpiCRawSymbol};
pub use errors::{OpiCErrorCode, OpiError, Result};
pub use gpu::{
    OpiCCopyDirection, OpiCDevicePtr, OpiCDeviceProperties, OpiCGpuBackend, OpiCGpuPlatform, OpiCGpuSupport,
    OpiFDowncastGpuSupport,
};
pub use host::{OpiCErrorCallback, OpiCHost, OpiCHostId, OpiCHostRef, OPI_NO_GPU_DEVICE_NAME};
pub use self::log::{OpiCLogConfig, OpiCLogConfigBuilder, OpiCLogger, OpiFInitLogging};
pub use module::{
    OpiCCollisionDetection, OpiCCustomPropagator, OpiCDistanceQuery, OpiCModule, OpiCModuleState,
    OpiCPerturbationModule, OpiCPropagator, OpiCPropagatorIntegrator,
};
pub use plugin::{
    OpiCCompatibilityGate, OpiCPluginCategory, OpiCPluginDescriptor, OpiCPluginInfo, OpiCPluginSource,
    OpiCPluginStatus, OpiCRejectReason, OpiCStaticPluginSource, OpiCSupportDecision,
};
pub use population::{OpiCIndexPair, OpiCOrbit, OpiCPopulation, OpiCVector3};
pub use version::{OpiCVersion, OPI_API_VERSION_MAJOR, OPI_API_VERSION_MINOR, OPI_API_VERSION_PATCH};
