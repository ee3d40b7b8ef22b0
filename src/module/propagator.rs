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

use crate::errors::OpiCErrorCode;
use crate::module::base::OpiCModule;
use crate::module::custom::OpiCCustomPropagator;
use crate::population::OpiCPopulation;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Advances a population in time.
pub trait OpiCPropagator: OpiCModule {
    /// Moves every object from `julian_day` forward by `dt` seconds.
    fn run_propagation(&mut self, population: &mut OpiCPopulation, julian_day: f64, dt: f32) -> OpiCErrorCode;

    /// Enables the propagator if needed, runs one step and reports failures
    /// to the host. On success the population epoch moves to the end of
    /// the step.
    fn propagate(&mut self, population: &mut OpiCPopulation, julian_day: f64, dt: f32) -> OpiCErrorCode {
        let code = self.enable();
        if !code.OpiFIsSuccess() {
            return self.report(code);
        }

        let code = self.run_propagation(population, julian_day, dt);
        if code.OpiFIsSuccess() {
            population.epoch = julian_day + f64::from(dt) / SECONDS_PER_DAY;
        }
        self.report(code)
    }

    /// Access to the composition API when this is a custom propagator.
    fn as_custom_mut(&mut self) -> Option<&mut OpiCCustomPropagator> {
        None
    }
}

/// Thin-pointer box returned by `OPI_Plugin_createPropagator`.
pub type OpiCPropagatorBox = Box<dyn OpiCPropagator>;
