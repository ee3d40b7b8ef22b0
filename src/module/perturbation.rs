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

//! Building blocks of [`crate::module::OpiCCustomPropagator`]: force
//! models that accumulate accelerations and an integrator that turns them
//! into new orbits.

use crate::errors::OpiCErrorCode;
use crate::module::base::OpiCModule;
use crate::population::{OpiCOrbit, OpiCVector3};

pub trait OpiCPerturbationModule: OpiCModule {
    /// Adds this module's contribution to `accelerations`, one entry per
    /// orbit. Implementations must add, not overwrite.
    fn calculate(
        &mut self,
        orbits: &[OpiCOrbit],
        accelerations: &mut [OpiCVector3],
        julian_day: f64,
        dt: f32,
    ) -> OpiCErrorCode;
}

pub trait OpiCPropagatorIntegrator: OpiCModule {
    fn integrate(
        &mut self,
        orbits: &mut [OpiCOrbit],
        accelerations: &[OpiCVector3],
        julian_day: f64,
        dt: f32,
    ) -> OpiCErrorCode;
}
