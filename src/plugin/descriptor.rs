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

//! # Plugin Descriptor
//!
//! One descriptor per candidate library: its decoded metadata, the source
//! its symbols come from and the outcome of loading it.
//!
//! A descriptor is valid when its source opened and `OPI_Plugin_info`
//! could be read. Invalid descriptors never reach the gate or the factory.
//! The host keeps every valid descriptor until teardown, so the library
//! behind it stays mapped for as long as objects created from it exist.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dynlib::OpiCRawSymbol;
use crate::errors::{OpiError, Result};
use crate::plugin::category::OpiCPluginCategory;
use crate::plugin::gate::OpiCRejectReason;
use crate::plugin::info::{OpiCPluginInfo, OpiCPluginInfoFfi, OpiFPluginInfo, OPI_PLUGIN_INFO_SYMBOL};
use crate::plugin::source::OpiCPluginSource;
use crate::version::OpiCVersion;

/// Extension of the optional per-plugin configuration file.
pub const OPI_PLUGIN_CONFIG_EXTENSION: &str = "cfg";

/// Outcome of loading one plugin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OpiCPluginStatus {
    /// Metadata read, not yet gated.
    Discovered,
    /// An object was created and added to a registry.
    Registered,
    /// The gate refused the plugin for this host or backend.
    Rejected(OpiCRejectReason),
    /// Nothing to instantiate, e.g. a category this host does not load.
    Skipped(String),
    /// Metadata or construction failed.
    Failed(String),
}

impl fmt::Display for OpiCPluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpiCPluginStatus::Discovered => f.write_str("discovered"),
            OpiCPluginStatus::Registered => f.write_str("registered"),
            OpiCPluginStatus::Rejected(reason) => write!(f, "rejected: {}", reason),
            OpiCPluginStatus::Skipped(reason) => write!(f, "skipped: {}", reason),
            OpiCPluginStatus::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

pub struct OpiCPluginDescriptor {
    path: PathBuf,
    info: OpiCPluginInfo,
    valid: bool,
    status: OpiCPluginStatus,
    config_file: Option<PathBuf>,
    source: Box<dyn OpiCPluginSource>,
}

impl fmt::Debug for OpiCPluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpiCPluginDescriptor")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("valid", &self.valid)
            .field("status", &self.status)
            .field("config_file", &self.config_file)
            .finish()
    }
}

impl OpiCPluginDescriptor {
    /// Reads the metadata of `source`.
    ///
    /// Never fails: a source without readable metadata yields an invalid
    /// descriptor whose status carries the reason.
    #[allow(non_snake_case)]
    pub fn OpiFFromSource(source: Box<dyn OpiCPluginSource>) -> Self {
        let path = source.path().to_path_buf();
        let fallback_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (info, valid, status) = match read_info(source.as_ref()) {
            Ok(info) => (info, true, OpiCPluginStatus::Discovered),
            Err(e) => {
                log::warn!(
                    "opi.plugin.metadata_failed: cannot read plugin metadata - path={}, error={}",
                    path.display(),
                    e
                );
                (
                    OpiCPluginInfo::OpiFUnknown(fallback_name),
                    false,
                    OpiCPluginStatus::Failed(e.to_string()),
                )
            }
        };

        OpiCPluginDescriptor {
            path,
            info,
            valid,
            status,
            config_file: None,
            source,
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFPath(&self) -> &Path {
        &self.path
    }

    #[allow(non_snake_case)]
    pub fn OpiFIsValid(&self) -> bool {
        self.valid
    }

    #[allow(non_snake_case)]
    pub fn OpiFInfo(&self) -> &OpiCPluginInfo {
        &self.info
    }

    #[allow(non_snake_case)]
    pub fn OpiFName(&self) -> &str {
        &self.info.name
    }

    #[allow(non_snake_case)]
    pub fn OpiFCategory(&self) -> OpiCPluginCategory {
        self.info.category
    }

    #[allow(non_snake_case)]
    pub fn OpiFVersion(&self) -> OpiCVersion {
        self.info.version
    }

    #[allow(non_snake_case)]
    pub fn OpiFStatus(&self) -> &OpiCPluginStatus {
        &self.status
    }

    #[allow(non_snake_case)]
    pub(crate) fn OpiFSetStatus(&mut self, status: OpiCPluginStatus) {
        self.status = status;
    }

    #[allow(non_snake_case)]
    pub fn OpiFConfigFile(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    #[allow(non_snake_case)]
    pub(crate) fn OpiFSetConfigFile(&mut self, config_file: Option<PathBuf>) {
        self.config_file = config_file;
    }

    #[allow(non_snake_case)]
    pub fn OpiFSymbol(&self, name: &str) -> Option<OpiCRawSymbol> {
        self.source.symbol(name)
    }

    /// Like [`Self::OpiFSymbol`], but a missing symbol is an error naming
    /// the plugin file.
    #[allow(non_snake_case)]
    pub fn OpiFRequireSymbol(&self, name: &str) -> Result<OpiCRawSymbol> {
        self.OpiFSymbol(name)
            .ok_or_else(|| OpiError::missing_symbol(self.path.to_string_lossy(), name))
    }
}

fn read_info(source: &dyn OpiCPluginSource) -> Result<OpiCPluginInfo> {
    let symbol = source
        .symbol(OPI_PLUGIN_INFO_SYMBOL)
        .ok_or_else(|| OpiError::missing_symbol(source.path().to_string_lossy(), OPI_PLUGIN_INFO_SYMBOL))?;

    let mut raw = OpiCPluginInfoFfi::default();
    // SAFETY: conforming plugins export `OPI_Plugin_info` with this
    // signature and only write into the record they are given.
    unsafe {
        let fill: OpiFPluginInfo = symbol.OpiFCast();
        fill(&mut raw);
    }

    let info = OpiCPluginInfo::from(&raw);
    if info.name.is_empty() {
        return Err(OpiError::malformed(
            source.path().to_string_lossy(),
            "plugin metadata has an empty name",
        ));
    }
    Ok(info)
}

/// `<dir>/<basename>.cfg` next to `plugin_path`, if that file exists.
#[allow(non_snake_case)]
pub fn OpiFSiblingConfigFile(plugin_path: &Path) -> Option<PathBuf> {
    let candidate = plugin_path.with_extension(OPI_PLUGIN_CONFIG_EXTENSION);
    if candidate.is_file() {
        Some(candidate)
    } else {
        None
    }
}
