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
use crate::population::{OpiCIndexPair, OpiCPopulation};

/// Spatial index over a population answering proximity queries.
pub trait OpiCDistanceQuery: OpiCModule {
    /// Rebuilds the index from the current orbits.
    fn rebuild(&mut self, population: &OpiCPopulation) -> OpiCErrorCode;

    /// Replaces the contents of `pairs` with every pair of objects sharing
    /// a cube of edge length `cube_size` (km).
    fn query_cubic_pairs(
        &mut self,
        population: &OpiCPopulation,
        cube_size: f32,
        pairs: &mut Vec<OpiCIndexPair>,
    ) -> OpiCErrorCode;
}

/// Thin-pointer box returned by `OPI_Plugin_createDistanceQuery`.
pub type OpiCDistanceQueryBox = Box<dyn OpiCDistanceQuery>;
