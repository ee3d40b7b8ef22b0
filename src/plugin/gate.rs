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

//! # Compatibility Gate
//!
//! Decides whether a plugin may run against this host and the active GPU
//! backend. Checks are applied in a fixed order and the first one that
//! matches decides:
//!
//! 1. The plugin needs a newer host than this one.
//! 2. The plugin was built for an older major (ABI) version.
//! 3. The plugin needs no GPU: accepted.
//! 4. The plugin needs CUDA: the active platform must be CUDA and the
//!    selected device's capability must be at least the required one. An
//!    unknown capability (0) is accepted with a warning.
//! 5. The plugin needs OpenCL: the active platform must be OpenCL. The
//!    required OpenCL version is not compared against the device.
//!
//! The gate only logs; turning a rejection into a descriptor status is the
//! host's job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gpu::OpiCGpuPlatform;
use crate::plugin::descriptor::OpiCPluginDescriptor;
use crate::plugin::info::OpiCPluginInfo;
use crate::version::OpiCVersion;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpiCRejectReason {
    PluginNewerThanHost { required: OpiCVersion, host: OpiCVersion },
    PluginOutdated { required: OpiCVersion, host: OpiCVersion },
    CudaUnavailable { active: OpiCGpuPlatform },
    CapabilityTooLow { required: i32, available: i32 },
    OpenClUnavailable { active: OpiCGpuPlatform },
    /// The descriptor's metadata could not be read.
    MetadataUnavailable,
}

impl fmt::Display for OpiCRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpiCRejectReason::PluginNewerThanHost { required, host } => write!(
                f,
                "plugin requires host version {} but this host is {}",
                required, host
            ),
            OpiCRejectReason::PluginOutdated { required, host } => write!(
                f,
                "plugin is outdated: built for API {} which is incompatible with {}",
                required, host
            ),
            OpiCRejectReason::CudaUnavailable { active } => {
                write!(f, "plugin requires CUDA but the active platform is {}", active)
            }
            OpiCRejectReason::CapabilityTooLow { required, available } => write!(
                f,
                "plugin requires CUDA compute capability {} but the device provides {}",
                required, available
            ),
            OpiCRejectReason::OpenClUnavailable { active } => {
                write!(f, "plugin requires OpenCL but the active platform is {}", active)
            }
            OpiCRejectReason::MetadataUnavailable => f.write_str("plugin metadata is unavailable"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpiCSupportDecision {
    Accepted,
    /// CUDA plugin accepted although the device capability is unknown.
    AcceptedUnverified,
    Rejected(OpiCRejectReason),
}

impl OpiCSupportDecision {
    #[allow(non_snake_case)]
    pub fn OpiFIsAccepted(&self) -> bool {
        !matches!(self, OpiCSupportDecision::Rejected(_))
    }
}

/// What the gate compares plugins against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpiCCompatibilityGate {
    pub host_version: OpiCVersion,
    pub platform: OpiCGpuPlatform,
    /// Capability of the selected device, 0 when unknown or no backend.
    pub device_capability: i32,
}

impl OpiCCompatibilityGate {
    #[allow(non_snake_case)]
    pub fn OpiFNew(platform: OpiCGpuPlatform, device_capability: i32) -> Self {
        OpiCCompatibilityGate {
            host_version: OpiCVersion::OpiFHost(),
            platform,
            device_capability,
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFWithHostVersion(mut self, host_version: OpiCVersion) -> Self {
        self.host_version = host_version;
        self
    }

    /// Pure decision over decoded metadata.
    #[allow(non_snake_case)]
    pub fn OpiFEvaluate(&self, info: &OpiCPluginInfo) -> OpiCSupportDecision {
        let required = info.min_host_version;
        let host = self.host_version;

        if required > host {
            return OpiCSupportDecision::Rejected(OpiCRejectReason::PluginNewerThanHost { required, host });
        }
        if required.major != host.major {
            return OpiCSupportDecision::Rejected(OpiCRejectReason::PluginOutdated { required, host });
        }

        let requirements = info.requirements;
        if !requirements.OpiFNeedsGpu() {
            return OpiCSupportDecision::Accepted;
        }

        if requirements.OpiFNeedsCuda() {
            if self.platform != OpiCGpuPlatform::Cuda {
                return OpiCSupportDecision::Rejected(OpiCRejectReason::CudaUnavailable {
                    active: self.platform,
                });
            }
            if self.device_capability <= 0 {
                return OpiCSupportDecision::AcceptedUnverified;
            }
            if requirements.cuda <= self.device_capability {
                return OpiCSupportDecision::Accepted;
            }
            return OpiCSupportDecision::Rejected(OpiCRejectReason::CapabilityTooLow {
                required: requirements.cuda,
                available: self.device_capability,
            });
        }

        if self.platform == OpiCGpuPlatform::OpenCl {
            OpiCSupportDecision::Accepted
        } else {
            OpiCSupportDecision::Rejected(OpiCRejectReason::OpenClUnavailable {
                active: self.platform,
            })
        }
    }

    /// Gates a descriptor and logs the outcome. Invalid descriptors are
    /// never accepted.
    #[allow(non_snake_case)]
    pub fn OpiFCheck(&self, descriptor: &OpiCPluginDescriptor) -> OpiCSupportDecision {
        if !descriptor.OpiFIsValid() {
            log::error!(
                "opi.gate.invalid_descriptor: refusing to gate an unreadable plugin - path={}",
                descriptor.OpiFPath().display()
            );
            return OpiCSupportDecision::Rejected(OpiCRejectReason::MetadataUnavailable);
        }

        let decision = self.OpiFEvaluate(descriptor.OpiFInfo());
        match &decision {
            OpiCSupportDecision::Accepted => log::debug!(
                "opi.gate.accepted: plugin supported - plugin={}, platform={}",
                descriptor.OpiFName(),
                self.platform
            ),
            OpiCSupportDecision::AcceptedUnverified => log::warn!(
                "opi.gate.unverified: cannot determine device compute capability, loading anyway - plugin={}, required={}",
                descriptor.OpiFName(),
                descriptor.OpiFInfo().requirements.cuda
            ),
            OpiCSupportDecision::Rejected(reason) => log::warn!(
                "opi.gate.rejected: plugin not supported - plugin={}, reason={}",
                descriptor.OpiFName(),
                reason
            ),
        }
        decision
    }

    #[allow(non_snake_case)]
    pub fn OpiFIsSupported(&self, descriptor: &OpiCPluginDescriptor) -> bool {
        self.OpiFCheck(descriptor).OpiFIsAccepted()
    }
}
