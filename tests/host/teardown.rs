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

#[path = "../support/mod.rs"]
mod support;

use std::ffi::c_void;

use opix::errors::OpiCErrorCode;
use opix::gpu::{OpiCDevicePtr, OpiCGpuPlatform};
use opix::host::OpiCHost;
use opix::module::{OpiCModule, OpiCModuleState, OpiCPerturbationModule};
use opix::plugin::OpiCPluginStatus;
use opix::population::{OpiCOrbit, OpiCVector3};
use proptest::prelude::*;
use support::*;

fn OpiCTStrings(events: &[&str]) -> Vec<String> {
    events.iter().map(|e| e.to_string()).collect()
}

/// Releases a device buffer while being disabled, so it needs a live backend.
struct OpiCTGpuModule {
    state: OpiCModuleState,
}

impl OpiCModule for OpiCTGpuModule {
    fn state(&self) -> &OpiCModuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut OpiCModuleState {
        &mut self.state
    }

    fn on_disable(&mut self) -> OpiCErrorCode {
        if let Some(host) = self.host() {
            host.OpiFGpuFree(OpiCDevicePtr(0x1000 as *mut c_void));
        }
        OpiFTRecord(format!("disable:{}", self.name()));
        OpiCErrorCode::Success
    }
}

impl OpiCPerturbationModule for OpiCTGpuModule {
    fn calculate(&mut self, _: &[OpiCOrbit], _: &mut [OpiCVector3], _: f64, _: f32) -> OpiCErrorCode {
        OpiCErrorCode::Success
    }
}

#[test]
fn OpiFTObjectsDieBeforeBackendAndLibraries() {
    let mut host = OpiCHost::OpiFNew().OpiFWithGpuSupport(OpiCTMockGpu::OpiFNew(OpiCGpuPlatform::OpenCl, 2, 1));
    let sources = [
        OpiCTRecordingSource::OpiFNew("lib-a", OpiFTPropagatorSource("liba.so", OpiFTInfoPropagator)),
        OpiCTRecordingSource::OpiFNew("lib-b", OpiFTTablePropagatorSource("libb.so")),
        OpiCTRecordingSource::OpiFNew("lib-c", OpiFTQuerySource("libc.so")),
        OpiCTRecordingSource::OpiFNew("lib-d", OpiFTDetectionSource("libd.so")),
        OpiCTRecordingSource::OpiFNew("lib-e", OpiFTTableDetectionSource("libe.so")),
    ];
    for source in sources {
        assert_eq!(host.OpiFLoadPluginSource(source, None), OpiCPluginStatus::Registered);
    }

    OpiFTClearEvents();
    drop(host);

    assert_eq!(
        OpiFTEvents(),
        OpiCTStrings(&[
            "disable:kepler",
            "drop:kepler",
            "table-propagator:disable",
            "table-propagator:destroy",
            "disable:grid-query",
            "drop:grid-query",
            "disable:pair-detection",
            "drop:pair-detection",
            "table-detection:disable",
            "table-detection:destroy",
            "gpu:shutdown",
            "gpu:drop",
            "unload:lib-a",
            "unload:lib-b",
            "unload:lib-c",
            "unload:lib-d",
            "unload:lib-e",
        ])
    );
}

#[test]
fn OpiFTRejectedPluginsStayLoadedUntilTeardown() {
    OpiFTClearEvents();
    let mut host = OpiCHost::OpiFNew();
    let source = OpiCTRecordingSource::OpiFNew("lib-cuda", OpiFTPropagatorSource("libcuda.so", OpiFTInfoCudaPropagator));

    assert!(matches!(host.OpiFLoadPluginSource(source, None), OpiCPluginStatus::Rejected(_)));
    assert!(OpiFTEvents().is_empty());

    drop(host);
    assert_eq!(OpiFTEvents(), OpiCTStrings(&["unload:lib-cuda"]));
}

#[test]
fn OpiFTModulesUseBackendWhileDisabling() {
    let mut host = OpiCHost::OpiFNew().OpiFWithGpuSupport(OpiCTMockGpu::OpiFNew(OpiCGpuPlatform::Cuda, 6, 1));
    host.OpiFRegisterPerturbationModule(Box::new(OpiCTGpuModule {
        state: OpiCModuleState::OpiFNew("solar-pressure"),
    }));
    let custom = host.OpiFCreateCustomPropagator("composed").expect("custom propagator");
    custom.OpiFAddModule(Box::new(OpiCTGpuModule {
        state: OpiCModuleState::OpiFNew("drag"),
    }));

    OpiFTClearEvents();
    drop(host);

    assert_eq!(
        OpiFTEvents(),
        OpiCTStrings(&[
            "gpu:free",
            "disable:drag",
            "gpu:free",
            "disable:solar-pressure",
            "gpu:shutdown",
            "gpu:drop",
        ])
    );
}

#[test]
fn OpiFTFailedBackendIsDiscarded() {
    OpiFTClearEvents();
    let host = OpiCHost::OpiFNew().OpiFWithGpuSupport(OpiCTMockGpu::OpiFFailing(OpiCGpuPlatform::Cuda));

    assert!(!host.OpiFHasGpuBackend());
    assert_eq!(OpiFTEvents(), OpiCTStrings(&["gpu:init", "gpu:drop"]));

    drop(host);
    assert_eq!(OpiFTEvents(), OpiCTStrings(&["gpu:init", "gpu:drop"]));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn OpiFTTeardownOrderHolds(propagators in 0usize..4, queries in 0usize..4, detections in 0usize..4, gpu in any::<bool>()) {
        let mut host = OpiCHost::OpiFNew();
        if gpu {
            host = host.OpiFWithGpuSupport(OpiCTMockGpu::OpiFNew(OpiCGpuPlatform::OpenCl, 1, 1));
        }

        let mut labels = Vec::new();
        for i in 0..propagators {
            let label = format!("p{}", i);
            let source = if i % 2 == 0 {
                OpiFTPropagatorSource(&label, OpiFTInfoPropagator)
            } else {
                OpiFTTablePropagatorSource(&label)
            };
            host.OpiFLoadPluginSource(OpiCTRecordingSource::OpiFNew(&label, source), None);
            labels.push(label);
        }
        for i in 0..queries {
            let label = format!("q{}", i);
            let source = if i % 2 == 0 { OpiFTQuerySource(&label) } else { OpiFTTableQuerySource(&label) };
            host.OpiFLoadPluginSource(OpiCTRecordingSource::OpiFNew(&label, source), None);
            labels.push(label);
        }
        for i in 0..detections {
            let label = format!("d{}", i);
            let source = if i % 2 == 0 { OpiFTDetectionSource(&label) } else { OpiFTTableDetectionSource(&label) };
            host.OpiFLoadPluginSource(OpiCTRecordingSource::OpiFNew(&label, source), None);
            labels.push(label);
        }

        OpiFTClearEvents();
        drop(host);
        let events = OpiFTEvents();

        let destroyed: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.starts_with("drop:") || e.ends_with(":destroy"))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(destroyed.len(), propagators + queries + detections);

        let unloads: Vec<String> = events.iter().filter(|e| e.starts_with("unload:")).cloned().collect();
        let expected: Vec<String> = labels.iter().map(|l| format!("unload:{}", l)).collect();
        prop_assert_eq!(&unloads, &expected);

        let first_unload = events.iter().position(|e| e.starts_with("unload:")).unwrap_or(events.len());
        prop_assert!(destroyed.iter().all(|&i| i < first_unload));

        match OpiFTPosition(&events, "gpu:shutdown") {
            Some(shutdown) => {
                prop_assert!(gpu);
                prop_assert!(destroyed.iter().all(|&i| i < shutdown));
                prop_assert!(shutdown < first_unload);
            }
            None => {
                prop_assert!(!gpu);
            }
        }

        // Propagators, then queries, then detections.
        let kind = |e: &String| {
            if e.contains("kepler") || e.starts_with("table-propagator") {
                0
            } else if e.contains("grid-query") || e.starts_with("table-query") {
                1
            } else {
                2
            }
        };
        let kinds: Vec<i32> = destroyed.iter().map(|&i| kind(&events[i])).collect();
        prop_assert!(kinds.windows(2).all(|w| w[0] <= w[1]));
    }
}
