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

//! A propagator assembled at runtime from perturbation modules and one
//! integrator.
//!
//! Enabling the propagator enables its parts. Each step clears the
//! population's acceleration buffer, lets every enabled module add its
//! contribution and hands the result to the integrator. Modules disabled
//! by the application are skipped; a module error stops the step before
//! the integrator runs.

use crate::errors::OpiCErrorCode;
use crate::host::OpiCHostRef;
use crate::module::base::{OpiCModule, OpiCModuleState};
use crate::module::perturbation::{OpiCPerturbationModule, OpiCPropagatorIntegrator};
use crate::module::propagator::OpiCPropagator;
use crate::population::OpiCPopulation;

pub struct OpiCCustomPropagator {
    state: OpiCModuleState,
    modules: Vec<Box<dyn OpiCPerturbationModule>>,
    integrator: Option<Box<dyn OpiCPropagatorIntegrator>>,
}

impl OpiCCustomPropagator {
    #[allow(non_snake_case)]
    pub fn OpiFNew(name: impl Into<String>) -> Self {
        OpiCCustomPropagator {
            state: OpiCModuleState::OpiFNew(name).OpiFWithDescription("propagator composed of modules"),
            modules: Vec::new(),
            integrator: None,
        }
    }

    /// Adds a module. It inherits this propagator's host link and its
    /// enabled state.
    #[allow(non_snake_case)]
    pub fn OpiFAddModule(&mut self, mut module: Box<dyn OpiCPerturbationModule>) {
        if let Some(host) = self.state.OpiFHost() {
            module.attach_host(host.clone());
        }
        if self.state.OpiFIsEnabled() {
            module.enable();
        }
        log::debug!(
            "opi.custom.module_added: module added - propagator={}, module={}",
            self.state.OpiFName(),
            module.name()
        );
        self.modules.push(module);
    }

    /// Sets the integrator, replacing and disabling any previous one.
    #[allow(non_snake_case)]
    pub fn OpiFSetIntegrator(&mut self, mut integrator: Box<dyn OpiCPropagatorIntegrator>) {
        if let Some(host) = self.state.OpiFHost() {
            integrator.attach_host(host.clone());
        }
        if self.state.OpiFIsEnabled() {
            integrator.enable();
        }
        if let Some(mut previous) = self.integrator.replace(integrator) {
            previous.disable();
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFModuleCount(&self) -> usize {
        self.modules.len()
    }

    #[allow(non_snake_case)]
    pub fn OpiFHasIntegrator(&self) -> bool {
        self.integrator.is_some()
    }
}

impl OpiCModule for OpiCCustomPropagator {
    fn state(&self) -> &OpiCModuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut OpiCModuleState {
        &mut self.state
    }

    fn attach_host(&mut self, host: OpiCHostRef) {
        if !self.state.OpiFSetHost(host.clone()) {
            return;
        }
        for module in self.modules.iter_mut() {
            module.attach_host(host.clone());
        }
        if let Some(integrator) = self.integrator.as_mut() {
            integrator.attach_host(host);
        }
    }

    fn on_enable(&mut self) -> OpiCErrorCode {
        for module in self.modules.iter_mut() {
            let code = module.enable();
            if !code.OpiFIsSuccess() {
                return code;
            }
        }
        match self.integrator.as_mut() {
            Some(integrator) => integrator.enable(),
            None => OpiCErrorCode::Success,
        }
    }

    fn on_disable(&mut self) -> OpiCErrorCode {
        let mut result = OpiCErrorCode::Success;
        for module in self.modules.iter_mut() {
            let code = module.disable();
            if result.OpiFIsSuccess() {
                result = code;
            }
        }
        if let Some(integrator) = self.integrator.as_mut() {
            let code = integrator.disable();
            if result.OpiFIsSuccess() {
                result = code;
            }
        }
        result
    }
}

impl OpiCPropagator for OpiCCustomPropagator {
    fn run_propagation(&mut self, population: &mut OpiCPopulation, julian_day: f64, dt: f32) -> OpiCErrorCode {
        let integrator = match self.integrator.as_mut() {
            Some(integrator) => integrator,
            None => {
                log::warn!(
                    "opi.custom.no_integrator: propagator has no integrator - propagator={}",
                    self.state.OpiFName()
                );
                return OpiCErrorCode::InvalidArgument;
            }
        };

        population.OpiFResetAccelerations();
        let (orbits, accelerations) = population.OpiFSplitMut();

        for module in self.modules.iter_mut() {
            if !module.is_enabled() {
                continue;
            }
            let code = module.calculate(orbits, accelerations, julian_day, dt);
            if !code.OpiFIsSuccess() {
                log::warn!(
                    "opi.custom.module_failed: perturbation module failed - module={}, code={}",
                    module.name(),
                    code
                );
                return code;
            }
        }

        let code = integrator.enable();
        if !code.OpiFIsSuccess() {
            return code;
        }
        integrator.integrate(orbits, accelerations, julian_day, dt)
    }

    fn as_custom_mut(&mut self) -> Option<&mut OpiCCustomPropagator> {
        Some(self)
    }
}

impl Drop for OpiCCustomPropagator {
    fn drop(&mut self) {
        self.disable();
    }
}
