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

//! # Module Base
//!
//! State and behavior shared by every object the host owns: a name used
//! for lookup, the enabled flag and the link back to the host.
//!
//! Implementors embed an [`OpiCModuleState`] and expose it through
//! `state`/`state_mut`; everything else has a default. Resource setup and
//! release go into `on_enable`/`on_disable`, which run only on actual
//! state changes.

use std::path::Path;

use crate::errors::OpiCErrorCode;
use crate::host::OpiCHostRef;

#[derive(Clone, Debug, Default)]
pub struct OpiCModuleState {
    name: String,
    author: String,
    description: String,
    enabled: bool,
    host: Option<OpiCHostRef>,
}

impl OpiCModuleState {
    #[allow(non_snake_case)]
    pub fn OpiFNew(name: impl Into<String>) -> Self {
        OpiCModuleState {
            name: name.into(),
            ..Default::default()
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFWithAuthor(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    #[allow(non_snake_case)]
    pub fn OpiFWithDescription(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[allow(non_snake_case)]
    pub fn OpiFName(&self) -> &str {
        &self.name
    }

    #[allow(non_snake_case)]
    pub fn OpiFAuthor(&self) -> &str {
        &self.author
    }

    #[allow(non_snake_case)]
    pub fn OpiFDescription(&self) -> &str {
        &self.description
    }

    #[allow(non_snake_case)]
    pub fn OpiFIsEnabled(&self) -> bool {
        self.enabled
    }

    #[allow(non_snake_case)]
    pub fn OpiFSetEnabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[allow(non_snake_case)]
    pub fn OpiFHost(&self) -> Option<&OpiCHostRef> {
        self.host.as_ref()
    }

    /// Sets the host link. The link is set once; later calls are ignored
    /// and return `false`.
    #[allow(non_snake_case)]
    pub fn OpiFSetHost(&mut self, host: OpiCHostRef) -> bool {
        if self.host.is_some() {
            log::warn!(
                "opi.module.host_already_set: ignoring second host link - module={}",
                self.name
            );
            return false;
        }
        self.host = Some(host);
        true
    }
}

pub trait OpiCModule {
    fn state(&self) -> &OpiCModuleState;

    fn state_mut(&mut self) -> &mut OpiCModuleState;

    fn on_enable(&mut self) -> OpiCErrorCode {
        OpiCErrorCode::Success
    }

    fn on_disable(&mut self) -> OpiCErrorCode {
        OpiCErrorCode::Success
    }

    /// Receives the plugin's sibling configuration file. Its format is
    /// private to the plugin.
    fn load_config_file(&mut self, _path: &Path) -> OpiCErrorCode {
        OpiCErrorCode::Success
    }

    /// Called once when the object is registered with a host. Composite
    /// objects override this to pass the link on to their parts.
    fn attach_host(&mut self, host: OpiCHostRef) {
        self.state_mut().OpiFSetHost(host);
    }

    fn name(&self) -> &str {
        self.state().OpiFName()
    }

    fn is_enabled(&self) -> bool {
        self.state().OpiFIsEnabled()
    }

    fn host(&self) -> Option<&OpiCHostRef> {
        self.state().OpiFHost()
    }

    fn enable(&mut self) -> OpiCErrorCode {
        if self.is_enabled() {
            return OpiCErrorCode::Success;
        }
        let code = self.on_enable();
        if code.OpiFIsSuccess() {
            self.state_mut().OpiFSetEnabled(true);
            log::debug!("opi.module.enabled: module enabled - module={}", self.name());
        } else {
            log::warn!(
                "opi.module.enable_failed: module refused to enable - module={}, code={}",
                self.name(),
                code
            );
        }
        code
    }

    fn disable(&mut self) -> OpiCErrorCode {
        if !self.is_enabled() {
            return OpiCErrorCode::Success;
        }
        let code = self.on_disable();
        self.state_mut().OpiFSetEnabled(false);
        log::debug!(
            "opi.module.disabled: module disabled - module={}, code={}",
            self.name(),
            code
        );
        code
    }

    /// Reports a non-success code to the owning host, if any, and returns it.
    fn report(&self, code: OpiCErrorCode) -> OpiCErrorCode {
        if !code.OpiFIsSuccess() {
            if let Some(host) = self.host() {
                host.OpiFSendError(code);
            }
        }
        code
    }
}
