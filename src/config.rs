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

//! Host configuration.
//!
//! Applications usually keep this in a JSON file next to their own
//! settings:
//!
//! ```json
//! {
//!   "plugin_dir": "plugins",
//!   "platform": "opencl",
//!   "device": 0,
//!   "log": { "default_level": "DEBUG", "file_enabled": true, "file_path": "opi.log" }
//! }
//! ```
//!
//! Every field is optional. The platform accepts `none`, `cuda`,
//! `opencl` or `cl` in any letter case.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{OpiError, Result};
use crate::gpu::OpiCGpuPlatform;
use crate::log::{OpiCLogConfig, OpiCLogConfigBuilder};

pub const OPI_DEFAULT_PLUGIN_DIR: &str = "plugins";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpiCHostConfig {
    pub plugin_dir: PathBuf,
    pub platform: OpiCGpuPlatform,
    /// Device selected right after the GPU backend initializes.
    pub device: Option<i32>,
    /// Logger installed by `OpiCHost::OpiFWithConfig`, if any.
    pub log: Option<OpiCLogConfig>,
}

impl Default for OpiCHostConfig {
    fn default() -> Self {
        OpiCHostConfig {
            plugin_dir: PathBuf::from(OPI_DEFAULT_PLUGIN_DIR),
            platform: OpiCGpuPlatform::None,
            device: None,
            log: None,
        }
    }
}

impl OpiCHostConfig {
    /// Strict parse: unknown platforms and malformed fields are errors.
    #[allow(non_snake_case)]
    pub fn OpiFFromJson(value: &Value) -> Result<Self> {
        let builder: OpiCHostConfigBuilder = serde_json::from_value(value.clone())?;
        builder.OpiFBuild()
    }

    #[allow(non_snake_case)]
    pub fn OpiFFromPath(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| OpiError::config(format!("cannot read '{}': {}", path.display(), e)))?;
        let value: Value = serde_json::from_str(&text)?;
        Self::OpiFFromJson(&value)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OpiCHostConfigBuilder {
    pub plugin_dir: Option<PathBuf>,
    /// Parsed on build so that any letter case is accepted.
    pub platform: Option<String>,
    pub device: Option<i32>,
    pub log: Option<OpiCLogConfigBuilder>,
}

impl OpiCHostConfigBuilder {
    #[allow(non_snake_case)]
    pub fn OpiFPluginDir(mut self, plugin_dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = Some(plugin_dir.into());
        self
    }

    #[allow(non_snake_case)]
    pub fn OpiFPlatform(mut self, platform: OpiCGpuPlatform) -> Self {
        self.platform = Some(platform.OpiFFrameworkName().to_string());
        self
    }

    #[allow(non_snake_case)]
    pub fn OpiFDevice(mut self, device: i32) -> Self {
        self.device = Some(device);
        self
    }

    #[allow(non_snake_case)]
    pub fn OpiFLog(mut self, log: OpiCLogConfigBuilder) -> Self {
        self.log = Some(log);
        self
    }

    #[allow(non_snake_case)]
    pub fn OpiFBuild(self) -> Result<OpiCHostConfig> {
        let base = OpiCHostConfig::default();
        let platform = match self.platform {
            Some(name) => name.parse::<OpiCGpuPlatform>()?,
            None => base.platform,
        };
        if let Some(device) = self.device {
            if device < 0 {
                return Err(OpiError::config(format!("device index must not be negative, got {}", device)));
            }
        }

        Ok(OpiCHostConfig {
            plugin_dir: self.plugin_dir.unwrap_or(base.plugin_dir),
            platform,
            device: self.device,
            log: self.log.map(OpiCLogConfigBuilder::OpiFBuild),
        })
    }
}
