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

//! Object population handed to propagators, queries and detectors.
//!
//! Only the parts that cross the plugin boundary live here: a contiguous
//! array of `#[repr(C)]` orbits and a matching acceleration buffer used by
//! composed propagators.

use serde::{Deserialize, Serialize};

/// Keplerian orbit of one object, laid out for C and GPU kernels.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpiCOrbit {
    pub semi_major_axis: f32,
    pub eccentricity: f32,
    pub inclination: f32,
    pub raan: f32,
    pub arg_of_perigee: f32,
    pub mean_anomaly: f32,
    /// Beginning of life, as a Julian day.
    pub bol: f32,
    /// End of life, as a Julian day. Zero means still alive.
    pub eol: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpiCVector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl OpiCVector3 {
    #[allow(non_snake_case)]
    pub fn OpiFAdd(&mut self, other: OpiCVector3) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

/// Pair of population indices reported by distance queries and collision
/// detectors.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpiCIndexPair {
    pub first: i32,
    pub second: i32,
}

#[derive(Clone, Debug, Default)]
pub struct OpiCPopulation {
    orbits: Vec<OpiCOrbit>,
    accelerations: Vec<OpiCVector3>,
    /// Julian day of the last completed propagation step.
    pub epoch: f64,
}

impl OpiCPopulation {
    #[allow(non_snake_case)]
    pub fn OpiFNew(size: usize) -> Self {
        OpiCPopulation {
            orbits: vec![OpiCOrbit::default(); size],
            accelerations: vec![OpiCVector3::default(); size],
            epoch: 0.0,
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFFromOrbits(orbits: Vec<OpiCOrbit>) -> Self {
        let accelerations = vec![OpiCVector3::default(); orbits.len()];
        OpiCPopulation {
            orbits,
            accelerations,
            epoch: 0.0,
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFSize(&self) -> usize {
        self.orbits.len()
    }

    #[allow(non_snake_case)]
    pub fn OpiFIsEmpty(&self) -> bool {
        self.orbits.is_empty()
    }

    #[allow(non_snake_case)]
    pub fn OpiFOrbits(&self) -> &[OpiCOrbit] {
        &self.orbits
    }

    #[allow(non_snake_case)]
    pub fn OpiFOrbitsMut(&mut self) -> &mut [OpiCOrbit] {
        &mut self.orbits
    }

    #[allow(non_snake_case)]
    pub fn OpiFAccelerations(&self) -> &[OpiCVector3] {
        &self.accelerations
    }

    /// Orbits and accelerations borrowed together, for integrators.
    #[allow(non_snake_case)]
    pub fn OpiFSplitMut(&mut self) -> (&mut [OpiCOrbit], &mut [OpiCVector3]) {
        (&mut self.orbits, &mut self.accelerations)
    }

    #[allow(non_snake_case)]
    pub fn OpiFResetAccelerations(&mut self) {
        self.accelerations
            .iter_mut()
            .for_each(|a| *a = OpiCVector3::default());
    }
}
