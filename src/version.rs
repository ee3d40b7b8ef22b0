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

//! Host ABI version and the version triple shared by hosts and plugins.
//!
//! The major component is the ABI generation: a plugin built against a
//! different major version is never loaded, in either direction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{OpiError, Result};

pub const OPI_API_VERSION_MAJOR: u32 = 1;
pub const OPI_API_VERSION_MINOR: u32 = 0;
pub const OPI_API_VERSION_PATCH: u32 = 0;

/// Semantic version triple. Ordering is lexicographic on
/// (major, minor, patch).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OpiCVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OpiCVersion {
    #[allow(non_snake_case)]
    pub const fn OpiFNew(major: u32, minor: u32, patch: u32) -> Self {
        OpiCVersion { major, minor, patch }
    }

    /// The version of the host ABI compiled into this crate.
    #[allow(non_snake_case)]
    pub const fn OpiFHost() -> Self {
        OpiCVersion::OpiFNew(
            OPI_API_VERSION_MAJOR,
            OPI_API_VERSION_MINOR,
            OPI_API_VERSION_PATCH,
        )
    }

    /// Builds a version from the signed integers found in plugin metadata.
    /// Negative components are clamped to zero.
    #[allow(non_snake_case)]
    pub fn OpiFFromRaw(major: i32, minor: i32, patch: i32) -> Self {
        OpiCVersion::OpiFNew(
            major.max(0) as u32,
            minor.max(0) as u32,
            patch.max(0) as u32,
        )
    }

    #[allow(non_snake_case)]
    pub fn OpiFParse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(OpiError::config(format!(
                "invalid version '{}', expected major[.minor[.patch]]",
                version_str
            )));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(parts.iter()) {
            *slot = part.parse::<u32>().map_err(|_| {
                OpiError::config(format!("invalid version component '{}' in '{}'", part, version_str))
            })?;
        }

        Ok(OpiCVersion::OpiFNew(numbers[0], numbers[1], numbers[2]))
    }
}

impl fmt::Display for OpiCVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
