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

//! # Plugin Loading
//!
//! Everything between a file on disk and a live object: the metadata ABI,
//! the source symbols are resolved from, descriptors, the compatibility
//! gate, the function-table adapters and the factory that ties them
//! together.

pub mod category;
pub mod descriptor;
pub mod factory;
pub mod gate;
pub mod info;
pub mod source;
pub mod table;

pub use category::OpiCPluginCategory;
pub use descriptor::{OpiCPluginDescriptor, OpiCPluginStatus, OpiFSiblingConfigFile};
pub use factory::{OpiCLoadedObject, OpiFCreateNative, OpiFInstantiate};
pub use gate::{OpiCCompatibilityGate, OpiCRejectReason, OpiCSupportDecision};
pub use info::{OpiCGpuRequirements, OpiCPluginInfo, OpiCPluginInfoFfi, OpiFPluginInfo, OPI_PLUGIN_INFO_SYMBOL};
pub use source::{OpiCPluginSource, OpiCStaticPluginSource};
pub use table::{
    OpiCCollisionDetectionTable, OpiCDistanceQueryTable, OpiCModuleTable, OpiCPropagatorTable,
    OpiCTableCollisionDetection, OpiCTableDistanceQuery, OpiCTablePropagator, OPI_PLUGIN_TABLE_ABI_VERSION,
};
