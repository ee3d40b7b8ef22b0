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

use std::collections::HashMap;

use log::{LevelFilter, Metadata};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration for [`crate::log::OpiCLogger`]: console and file output,
/// JSON or text lines, a default level and per-target overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpiCLogConfig {
    pub default_level: String,
    pub console_enabled: bool,
    pub json_format: bool,
    pub file_enabled: bool,
    pub file_path: Option<String>,
    /// "size" enables size-based rotation; anything else appends forever.
    pub rotate_when: Option<String>,
    pub max_bytes: Option<u64>,
    pub backup_count: Option<u32>,
    /// Level overrides keyed by target prefix, e.g. `"opix::plugin": "DEBUG"`.
    pub target_levels: HashMap<String, String>,
}

impl Default for OpiCLogConfig {
    fn default() -> Self {
        OpiCLogConfig {
            default_level: "INFO".to_string(),
            console_enabled: true,
            json_format: false,
            file_enabled: false,
            file_path: None,
            rotate_when: None,
            max_bytes: Some(10 * 1024 * 1024),
            backup_count: Some(7),
            target_levels: HashMap::new(),
        }
    }
}

impl OpiCLogConfig {
    /// Accepts the usual level names, case-insensitively. Unknown names
    /// fall back to `Info`.
    #[allow(non_snake_case)]
    pub fn OpiFParseLevel(level: &str) -> LevelFilter {
        match level.trim().to_ascii_uppercase().as_str() {
            "OFF" | "NONE" => LevelFilter::Off,
            "ERROR" => LevelFilter::Error,
            "WARN" | "WARNING" => LevelFilter::Warn,
            "DEBUG" => LevelFilter::Debug,
            "TRACE" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        }
    }

    /// Threshold for `target`: the longest matching override, else the
    /// default level.
    #[allow(non_snake_case)]
    pub fn OpiFLevelFor(&self, target: &str) -> LevelFilter {
        self.target_levels
            .iter()
            .filter(|(prefix, _)| target.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, level)| Self::OpiFParseLevel(level))
            .unwrap_or_else(|| Self::OpiFParseLevel(&self.default_level))
    }

    #[allow(non_snake_case)]
    pub fn OpiFShouldLog(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.OpiFLevelFor(metadata.target())
    }

    /// Most verbose level any target may use; handed to `log::set_max_level`.
    #[allow(non_snake_case)]
    pub fn OpiFMaxLevel(&self) -> LevelFilter {
        self.target_levels
            .values()
            .map(|level| Self::OpiFParseLevel(level))
            .chain(std::iter::once(Self::OpiFParseLevel(&self.default_level)))
            .max()
            .unwrap_or(LevelFilter::Info)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OpiCLogConfigBuilder {
    pub default_level: Option<String>,
    pub console_enabled: Option<bool>,
    pub json_format: Option<bool>,
    pub file_enabled: Option<bool>,
    pub file_path: Option<String>,
    pub rotate_when: Option<String>,
    pub max_bytes: Option<u64>,
    pub backup_count: Option<u32>,
    pub target_levels: Option<HashMap<String, String>>,
}

impl OpiCLogConfigBuilder {
    #[allow(non_snake_case)]
    pub fn OpiFBuild(self) -> OpiCLogConfig {
        let base = OpiCLogConfig::default();
        OpiCLogConfig {
            default_level: self.default_level.unwrap_or(base.default_level),
            console_enabled: self.console_enabled.unwrap_or(base.console_enabled),
            json_format: self.json_format.unwrap_or(base.json_format),
            file_enabled: self.file_enabled.unwrap_or(base.file_enabled),
            file_path: self.file_path.or(base.file_path),
            rotate_when: self.rotate_when.or(base.rotate_when),
            max_bytes: self.max_bytes.or(base.max_bytes),
            backup_count: self.backup_count.or(base.backup_count),
            target_levels: self.target_levels.unwrap_or(base.target_levels),
        }
    }

    /// Lenient parse: a malformed value yields the defaults.
    #[allow(non_snake_case)]
    pub fn OpiFFromJson(value: &Value) -> OpiCLogConfig {
        let builder: OpiCLogConfigBuilder =
            serde_json::from_value(value.clone()).unwrap_or_else(|_| OpiCLogConfigBuilder::default());
        builder.OpiFBuild()
    }
}
