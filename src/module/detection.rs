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
use crate::module::query::OpiCDistanceQuery;
use crate::population::{OpiCIndexPair, OpiCPopulation};

/// Finds colliding objects in a population.
pub trait OpiCCollisionDetection: OpiCModule {
    /// Replaces the contents of `pairs` with the objects that collided
    /// during the last `time_passed` seconds. A distance query may be
    /// supplied to narrow the candidate set.
    fn detect_pairs(
        &mut self,
        population: &OpiCPopulation,
        query: Option<&mut dyn OpiCDistanceQuery>,
        pairs: &mut Vec<OpiCIndexPair>,
        time_passed: f32,
    ) -> OpiCErrorCode;
}

/// Thin-pointer box returned by `OPI_Plugin_createCollisionDetection`.
pub type OpiCCollisionDetectionBox = Box<dyn OpiCCollisionDetection>;
