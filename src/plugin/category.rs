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

use std::fmt;

use serde::{Deserialize, Serialize};

pub const OPI_PLUGIN_CREATE_PROPAGATOR_SYMBOL: &str = "OPI_Plugin_createPropagator";
pub const OPI_PLUGIN_CREATE_DISTANCE_QUERY_SYMBOL: &str = "OPI_Plugin_createDistanceQuery";
pub const OPI_PLUGIN_CREATE_COLLISION_DETECTION_SYMBOL: &str = "OPI_Plugin_createCollisionDetection";

pub const OPI_PLUGIN_PROPAGATOR_TABLE_SYMBOL: &str = "OPI_Plugin_getPropagatorTable";
pub const OPI_PLUGIN_DISTANCE_QUERY_TABLE_SYMBOL: &str = "OPI_Plugin_getDistanceQueryTable";
pub const OPI_PLUGIN_COLLISION_DETECTION_TABLE_SYMBOL: &str = "OPI_Plugin_getCollisionDetectionTable";

/// Category a plugin declares in its metadata. The raw values are part of
/// the plugin ABI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpiCPluginCategory {
    Propagator,
    PerturbationModule,
    Integrator,
    DistanceQuery,
    CollisionDetection,
    CollisionHandling,
    /// A category this host version does not know.
    Unknown(i32),
}

impl OpiCPluginCategory {
    #[allow(non_snake_case)]
    pub fn OpiFFromRaw(raw: i32) -> Self {
        match raw {
            1 => OpiCPluginCategory::Propagator,
            2 => OpiCPluginCategory::PerturbationModule,
            3 => OpiCPluginCategory::Integrator,
            10 => OpiCPluginCategory::DistanceQuery,
            20 => OpiCPluginCategory::CollisionDetection,
            21 => OpiCPluginCategory::CollisionHandling,
            other => OpiCPluginCategory::Unknown(other),
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFToRaw(self) -> i32 {
        match self {
            OpiCPluginCategory::Propagator => 1,
            OpiCPluginCategory::PerturbationModule => 2,
            OpiCPluginCategory::Integrator => 3,
            OpiCPluginCategory::DistanceQuery => 10,
            OpiCPluginCategory::CollisionDetection => 20,
            OpiCPluginCategory::CollisionHandling => 21,
            OpiCPluginCategory::Unknown(raw) => raw,
        }
    }

    /// Exported constructor name for native-factory plugins of this
    /// category, if the host instantiates such plugins.
    #[allow(non_snake_case)]
    pub fn OpiFFactorySymbol(self) -> Option<&'static str> {
        match self {
            OpiCPluginCategory::Propagator => Some(OPI_PLUGIN_CREATE_PROPAGATOR_SYMBOL),
            OpiCPluginCategory::DistanceQuery => Some(OPI_PLUGIN_CREATE_DISTANCE_QUERY_SYMBOL),
            OpiCPluginCategory::CollisionDetection => Some(OPI_PLUGIN_CREATE_COLLISION_DETECTION_SYMBOL),
            _ => None,
        }
    }

    /// Exported function-table accessor for flat-table plugins.
    #[allow(non_snake_case)]
    pub fn OpiFTableSymbol(self) -> Option<&'static str> {
        match self {
            OpiCPluginCategory::Propagator => Some(OPI_PLUGIN_PROPAGATOR_TABLE_SYMBOL),
            OpiCPluginCategory::DistanceQuery => Some(OPI_PLUGIN_DISTANCE_QUERY_TABLE_SYMBOL),
            OpiCPluginCategory::CollisionDetection => Some(OPI_PLUGIN_COLLISION_DETECTION_TABLE_SYMBOL),
            _ => None,
        }
    }

    /// Whether plugins of this category are turned into live objects when
    /// found in a plugin directory.
    #[allow(non_snake_case)]
    pub fn OpiFIsInstantiable(self) -> bool {
        self.OpiFFactorySymbol().is_some()
    }
}

impl fmt::Display for OpiCPluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OpiCPluginCategory::Propagator => "propagator plugin",
            OpiCPluginCategory::PerturbationModule => "propagator module",
            OpiCPluginCategory::Integrator => "integrator plugin",
            OpiCPluginCategory::DistanceQuery => "distance query plugin",
            OpiCPluginCategory::CollisionDetection => "collision detection plugin",
            OpiCPluginCategory::CollisionHandling => "collision handling plugin",
            OpiCPluginCategory::Unknown(_) => "unknown plugin",
        };
        f.write_str(text)
    }
}
