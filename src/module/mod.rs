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

//! # Module Interfaces
//!
//! The abstract capability sets the host stores in its registries. Plugin
//! objects implement them directly (native factory) or through the
//! function-table adapters in `crate::plugin::table`; calling code never
//! sees which construction style produced an object.

pub mod base;
pub mod custom;
pub mod detection;
pub mod perturbation;
pub mod propagator;
pub mod query;

pub use base::{OpiCModule, OpiCModuleState};
pub use custom::OpiCCustomPropagator;
pub use detection::{OpiCCollisionDetection, OpiCCollisionDetectionBox};
pub use perturbation::{OpiCPerturbationModule, OpiCPropagatorIntegrator};
pub use propagator::{OpiCPropagator, OpiCPropagatorBox};
pub use query::{OpiCDistanceQuery, OpiCDistanceQueryBox};
