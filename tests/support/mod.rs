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

//! In-process plugins, a scriptable GPU backend and an event journal shared
//! by the integration tests. Plugins here export real `extern "C"`
//! functions and are handed to the host through `OpiCStaticPluginSource`,
//! so they travel the same descriptor, gate and factory path as a library
//! loaded from disk.

#![allow(dead_code)]

use std::any::Any;
use std::cell::RefCell;
use std::ffi::{c_void, CStr};
use std::os::raw::{c_char, c_int};
use std::path::Path;

use opix::errors::OpiCErrorCode;
use opix::gpu::{OpiCCopyDirection, OpiCDevicePtr, OpiCDeviceProperties, OpiCGpuPlatform, OpiCGpuSupport};
use opix::host::OpiCHostRef;
use opix::module::{
    OpiCCollisionDetection, OpiCCollisionDetectionBox, OpiCDistanceQuery, OpiCDistanceQueryBox, OpiCModule,
    OpiCModuleState, OpiCPropagator, OpiCPropagatorBox,
};
use opix::plugin::category::{
    OPI_PLUGIN_COLLISION_DETECTION_TABLE_SYMBOL, OPI_PLUGIN_CREATE_COLLISION_DETECTION_SYMBOL,
    OPI_PLUGIN_CREATE_DISTANCE_QUERY_SYMBOL, OPI_PLUGIN_CREATE_PROPAGATOR_SYMBOL,
    OPI_PLUGIN_DISTANCE_QUERY_TABLE_SYMBOL, OPI_PLUGIN_PROPAGATOR_TABLE_SYMBOL,
};
use opix::plugin::info::{OpiCPluginInfoFfi, OpiFPluginInfo, OPI_PLUGIN_INFO_SYMBOL};
use opix::plugin::source::{OpiCPluginSource, OpiCStaticPluginSource};
use opix::plugin::table::{
    OpiCCollisionDetectionTable, OpiCDistanceQueryTable, OpiCModuleTable, OpiCPropagatorTable,
    OPI_PLUGIN_TABLE_ABI_VERSION,
};
use opix::population::{OpiCIndexPair, OpiCOrbit, OpiCPopulation};
use opix::version::{OpiCVersion, OPI_API_VERSION_MAJOR};

// ----- event journal -----

thread_local! {
    static EVENTS: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

pub fn OpiFTRecord(event: impl Into<String>) {
    let event = event.into();
    EVENTS.with(|events| events.borrow_mut().push(event));
}

pub fn OpiFTEvents() -> Vec<String> {
    EVENTS.with(|events| events.borrow().clone())
}

pub fn OpiFTClearEvents() {
    EVENTS.with(|events| events.borrow_mut().clear());
}

/// Index of the first event equal to `event`.
pub fn OpiFTPosition(events: &[String], event: &str) -> Option<usize> {
    events.iter().position(|e| e == event)
}

// ----- plugin metadata -----

pub const OPI_TEST_CATEGORY_PROPAGATOR: i32 = 1;
pub const OPI_TEST_CATEGORY_INTEGRATOR: i32 = 3;
pub const OPI_TEST_CATEGORY_DISTANCE_QUERY: i32 = 10;
pub const OPI_TEST_CATEGORY_COLLISION_DETECTION: i32 = 20;

fn fill_info(
    info: *mut OpiCPluginInfoFfi,
    category: i32,
    name: &str,
    native: bool,
    cuda: i32,
    opencl: i32,
    min_host: OpiCVersion,
) {
    // SAFETY: the host passes a valid, exclusive record.
    let info = unsafe { &mut *info };
    info.category = category;
    info.OpiFSetName(name);
    info.OpiFSetAuthor("Opix test suite");
    info.OpiFSetDescription("in-process test plugin");
    info.OpiFSetVersion(OpiCVersion::OpiFNew(1, 2, 3));
    info.OpiFSetMinHostVersion(min_host);
    info.native_factory = native as c_int;
    info.requires_cuda = cuda;
    info.requires_opencl = opencl;
}

fn host_version() -> OpiCVersion {
    OpiCVersion::OpiFHost()
}

pub unsafe extern "C" fn OpiFTInfoPropagator(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, OPI_TEST_CATEGORY_PROPAGATOR, "kepler", true, 0, 0, host_version());
}

pub unsafe extern "C" fn OpiFTInfoCudaPropagator(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, OPI_TEST_CATEGORY_PROPAGATOR, "kepler", true, 5, 0, host_version());
}

pub unsafe extern "C" fn OpiFTInfoOpenClPropagator(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, OPI_TEST_CATEGORY_PROPAGATOR, "kepler", true, 0, 1, host_version());
}

pub unsafe extern "C" fn OpiFTInfoNewerPropagator(info: *mut OpiCPluginInfoFfi) {
    let min_host = OpiCVersion::OpiFNew(OPI_API_VERSION_MAJOR + 1, 0, 0);
    fill_info(info, OPI_TEST_CATEGORY_PROPAGATOR, "kepler-next", true, 0, 0, min_host);
}

pub unsafe extern "C" fn OpiFTInfoTablePropagator(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, OPI_TEST_CATEGORY_PROPAGATOR, "table-propagator", false, 0, 0, host_version());
}

pub unsafe extern "C" fn OpiFTInfoQuery(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, OPI_TEST_CATEGORY_DISTANCE_QUERY, "grid-query", true, 0, 0, host_version());
}

pub unsafe extern "C" fn OpiFTInfoTableQuery(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, OPI_TEST_CATEGORY_DISTANCE_QUERY, "table-query", false, 0, 0, host_version());
}

pub unsafe extern "C" fn OpiFTInfoDetection(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, OPI_TEST_CATEGORY_COLLISION_DETECTION, "pair-detection", true, 0, 0, host_version());
}

pub unsafe extern "C" fn OpiFTInfoTableDetection(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, OPI_TEST_CATEGORY_COLLISION_DETECTION, "table-detection", false, 0, 0, host_version());
}

pub unsafe extern "C" fn OpiFTInfoIntegrator(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, OPI_TEST_CATEGORY_INTEGRATOR, "rk4", true, 0, 0, host_version());
}

pub unsafe extern "C" fn OpiFTInfoFutureCategory(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, 99, "from-the-future", true, 0, 0, host_version());
}

pub unsafe extern "C" fn OpiFTInfoNameless(info: *mut OpiCPluginInfoFfi) {
    fill_info(info, OPI_TEST_CATEGORY_PROPAGATOR, "", true, 0, 0, host_version());
}

// ----- native objects -----

pub struct OpiCTRecordingPropagator {
    state: OpiCModuleState,
    pub steps: usize,
}

impl OpiCTRecordingPropagator {
    pub fn OpiFNew(name: &str) -> Self {
        OpiCTRecordingPropagator {
            state: OpiCModuleState::OpiFNew(name),
            steps: 0,
        }
    }
}

impl OpiCModule for OpiCTRecordingPropagator {
    fn state(&self) -> &OpiCModuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut OpiCModuleState {
        &mut self.state
    }

    fn on_enable(&mut self) -> OpiCErrorCode {
        OpiFTRecord(format!("enable:{}", self.name()));
        OpiCErrorCode::Success
    }

    fn on_disable(&mut self) -> OpiCErrorCode {
        OpiFTRecord(format!("disable:{}", self.name()));
        OpiCErrorCode::Success
    }

    fn load_config_file(&mut self, path: &Path) -> OpiCErrorCode {
        let file = path.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
        OpiFTRecord(format!("config:{}:{}", self.name(), file));
        OpiCErrorCode::Success
    }
}

impl OpiCPropagator for OpiCTRecordingPropagator {
    fn run_propagation(&mut self, population: &mut OpiCPopulation, _julian_day: f64, dt: f32) -> OpiCErrorCode {
        self.steps += 1;
        for orbit in population.OpiFOrbitsMut() {
            orbit.mean_anomaly += dt;
        }
        OpiCErrorCode::Success
    }
}

impl Drop for OpiCTRecordingPropagator {
    fn drop(&mut self) {
        OpiFTRecord(format!("drop:{}", self.state.OpiFName()));
    }
}

pub struct OpiCTRecordingQuery {
    state: OpiCModuleState,
    pub rebuilds: usize,
}

impl OpiCTRecordingQuery {
    pub fn OpiFNew(name: &str) -> Self {
        OpiCTRecordingQuery {
            state: OpiCModuleState::OpiFNew(name),
            rebuilds: 0,
        }
    }
}

impl OpiCModule for OpiCTRecordingQuery {
    fn state(&self) -> &OpiCModuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut OpiCModuleState {
        &mut self.state
    }

    fn on_enable(&mut self) -> OpiCErrorCode {
        OpiFTRecord(format!("enable:{}", self.name()));
        OpiCErrorCode::Success
    }

    fn on_disable(&mut self) -> OpiCErrorCode {
        OpiFTRecord(format!("disable:{}", self.name()));
        OpiCErrorCode::Success
    }
}

impl OpiCDistanceQuery for OpiCTRecordingQuery {
    fn rebuild(&mut self, _population: &OpiCPopulation) -> OpiCErrorCode {
        self.rebuilds += 1;
        OpiCErrorCode::Success
    }

    /// Reports every pair of neighbouring indices.
    fn query_cubic_pairs(
        &mut self,
        population: &OpiCPopulation,
        _cube_size: f32,
        pairs: &mut Vec<OpiCIndexPair>,
    ) -> OpiCErrorCode {
        pairs.clear();
        for i in 1..population.OpiFSize() {
            pairs.push(OpiCIndexPair {
                first: (i - 1) as i32,
                second: i as i32,
            });
        }
        OpiCErrorCode::Success
    }
}

impl Drop for OpiCTRecordingQuery {
    fn drop(&mut self) {
        OpiFTRecord(format!("drop:{}", self.state.OpiFName()));
    }
}

pub struct OpiCTRecordingDetection {
    state: OpiCModuleState,
}

impl OpiCTRecordingDetection {
    pub fn OpiFNew(name: &str) -> Self {
        OpiCTRecordingDetection {
            state: OpiCModuleState::OpiFNew(name),
        }
    }
}

impl OpiCModule for OpiCTRecordingDetection {
    fn state(&self) -> &OpiCModuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut OpiCModuleState {
        &mut self.state
    }

    fn on_enable(&mut self) -> OpiCErrorCode {
        OpiFTRecord(format!("enable:{}", self.name()));
        OpiCErrorCode::Success
    }

    fn on_disable(&mut self) -> OpiCErrorCode {
        OpiFTRecord(format!("disable:{}", self.name()));
        OpiCErrorCode::Success
    }
}

impl OpiCCollisionDetection for OpiCTRecordingDetection {
    /// Keeps the query's candidates whose indices are both even.
    fn detect_pairs(
        &mut self,
        population: &OpiCPopulation,
        query: Option<&mut dyn OpiCDistanceQuery>,
        pairs: &mut Vec<OpiCIndexPair>,
        _time_passed: f32,
    ) -> OpiCErrorCode {
        pairs.clear();
        let query = match query {
            Some(query) => query,
            None => return OpiCErrorCode::InvalidArgument,
        };
        let mut candidates = Vec::new();
        let code = query.query_cubic_pairs(population, 10.0, &mut candidates);
        if !code.OpiFIsSuccess() {
            return code;
        }
        pairs.extend(
            candidates
                .into_iter()
                .filter(|pair| pair.first % 2 == 0 || pair.second % 2 == 0),
        );
        OpiCErrorCode::Success
    }
}

impl Drop for OpiCTRecordingDetection {
    fn drop(&mut self) {
        OpiFTRecord(format!("drop:{}", self.state.OpiFName()));
    }
}

// ----- native factories -----

pub unsafe extern "C" fn OpiFTCreatePropagator(host: *const OpiCHostRef) -> *mut OpiCPropagatorBox {
    if !host.is_null() && (*host).OpiFIsAlive() {
        OpiFTRecord("factory:kepler:host-alive");
    }
    let object: OpiCPropagatorBox = Box::new(OpiCTRecordingPropagator::OpiFNew("kepler"));
    Box::into_raw(Box::new(object))
}

pub unsafe extern "C" fn OpiFTCreateQuery(_host: *const OpiCHostRef) -> *mut OpiCDistanceQueryBox {
    let object: OpiCDistanceQueryBox = Box::new(OpiCTRecordingQuery::OpiFNew("grid-query"));
    Box::into_raw(Box::new(object))
}

pub unsafe extern "C" fn OpiFTCreateDetection(_host: *const OpiCHostRef) -> *mut OpiCCollisionDetectionBox {
    let object: OpiCCollisionDetectionBox = Box::new(OpiCTRecordingDetection::OpiFNew("pair-detection"));
    Box::into_raw(Box::new(object))
}

pub unsafe extern "C" fn OpiFTCreateNothing(_host: *const OpiCHostRef) -> *mut OpiCPropagatorBox {
    std::ptr::null_mut()
}

// ----- function tables -----

unsafe extern "C" fn table_propagator_create() -> *mut c_void {
    OpiFTRecord("table-propagator:create");
    Box::into_raw(Box::new(0u64)) as *mut c_void
}

unsafe extern "C" fn table_propagator_destroy(state: *mut c_void) {
    OpiFTRecord("table-propagator:destroy");
    drop(Box::from_raw(state as *mut u64));
}

unsafe extern "C" fn table_propagator_enable(_state: *mut c_void) -> c_int {
    OpiFTRecord("table-propagator:enable");
    0
}

unsafe extern "C" fn table_propagator_disable(_state: *mut c_void) -> c_int {
    OpiFTRecord("table-propagator:disable");
    0
}

unsafe extern "C" fn table_propagator_load_config(_state: *mut c_void, path: *const c_char) -> c_int {
    let path = CStr::from_ptr(path).to_string_lossy().into_owned();
    let file = Path::new(&path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    OpiFTRecord(format!("table-propagator:config:{}", file));
    0
}

unsafe extern "C" fn table_propagator_propagate(
    state: *mut c_void,
    orbits: *mut OpiCOrbit,
    count: usize,
    _julian_day: f64,
    dt: f32,
) -> c_int {
    let steps = &mut *(state as *mut u64);
    *steps += 1;
    if count > 0 {
        for orbit in std::slice::from_raw_parts_mut(orbits, count) {
            orbit.mean_anomaly += dt * 2.0;
        }
    }
    0
}

static PROPAGATOR_TABLE: OpiCPropagatorTable = OpiCPropagatorTable {
    base: OpiCModuleTable {
        abi_version: OPI_PLUGIN_TABLE_ABI_VERSION,
        create: table_propagator_create,
        destroy: table_propagator_destroy,
        enable: Some(table_propagator_enable),
        disable: Some(table_propagator_disable),
        load_config: Some(table_propagator_load_config),
    },
    propagate: table_propagator_propagate,
};

static STALE_PROPAGATOR_TABLE: OpiCPropagatorTable = OpiCPropagatorTable {
    base: OpiCModuleTable {
        abi_version: OPI_PLUGIN_TABLE_ABI_VERSION + 1,
        create: table_propagator_create,
        destroy: table_propagator_destroy,
        enable: None,
        disable: None,
        load_config: None,
    },
    propagate: table_propagator_propagate,
};

pub unsafe extern "C" fn OpiFTGetPropagatorTable() -> *const OpiCPropagatorTable {
    &PROPAGATOR_TABLE
}

pub unsafe extern "C" fn OpiFTGetStalePropagatorTable() -> *const OpiCPropagatorTable {
    &STALE_PROPAGATOR_TABLE
}

unsafe extern "C" fn table_query_create() -> *mut c_void {
    OpiFTRecord("table-query:create");
    Box::into_raw(Box::new(0u64)) as *mut c_void
}

unsafe extern "C" fn table_query_destroy(state: *mut c_void) {
    OpiFTRecord("table-query:destroy");
    drop(Box::from_raw(state as *mut u64));
}

unsafe extern "C" fn table_query_rebuild(state: *mut c_void, _orbits: *const OpiCOrbit, count: usize) -> c_int {
    *(state as *mut u64) = count as u64;
    0
}

/// Neighbouring index pairs, written only when they all fit.
unsafe extern "C" fn table_query_pairs(
    _state: *mut c_void,
    _orbits: *const OpiCOrbit,
    count: usize,
    _cube_size: f32,
    pairs: *mut OpiCIndexPair,
    capacity: usize,
    written: *mut usize,
) -> c_int {
    let needed = count.saturating_sub(1);
    *written = needed;
    if needed <= capacity {
        for i in 0..needed {
            *pairs.add(i) = OpiCIndexPair {
                first: i as i32,
                second: i as i32 + 1,
            };
        }
    }
    0
}

static QUERY_TABLE: OpiCDistanceQueryTable = OpiCDistanceQueryTable {
    base: OpiCModuleTable {
        abi_version: OPI_PLUGIN_TABLE_ABI_VERSION,
        create: table_query_create,
        destroy: table_query_destroy,
        enable: None,
        disable: None,
        load_config: None,
    },
    rebuild: table_query_rebuild,
    query_cubic_pairs: table_query_pairs,
};

pub unsafe extern "C" fn OpiFTGetQueryTable() -> *const OpiCDistanceQueryTable {
    &QUERY_TABLE
}

unsafe extern "C" fn table_detection_create() -> *mut c_void {
    OpiFTRecord("table-detection:create");
    Box::into_raw(Box::new(0u64)) as *mut c_void
}

unsafe extern "C" fn table_detection_destroy(state: *mut c_void) {
    OpiFTRecord("table-detection:destroy");
    drop(Box::from_raw(state as *mut u64));
}

unsafe extern "C" fn table_detection_disable(_state: *mut c_void) -> c_int {
    OpiFTRecord("table-detection:disable");
    0
}

/// Reports objects 0 and 1 as colliding whenever both exist.
unsafe extern "C" fn table_detection_pairs(
    _state: *mut c_void,
    _orbits: *const OpiCOrbit,
    count: usize,
    _time_passed: f32,
    pairs: *mut OpiCIndexPair,
    capacity: usize,
    written: *mut usize,
) -> c_int {
    if count < 2 {
        *written = 0;
        return 0;
    }
    *written = 1;
    if capacity >= 1 {
        *pairs = OpiCIndexPair { first: 0, second: 1 };
    }
    0
}

static DETECTION_TABLE: OpiCCollisionDetectionTable = OpiCCollisionDetectionTable {
    base: OpiCModuleTable {
        abi_version: OPI_PLUGIN_TABLE_ABI_VERSION,
        create: table_detection_create,
        destroy: table_detection_destroy,
        enable: None,
        disable: Some(table_detection_disable),
        load_config: None,
    },
    detect_pairs: table_detection_pairs,
};

pub unsafe extern "C" fn OpiFTGetDetectionTable() -> *const OpiCCollisionDetectionTable {
    &DETECTION_TABLE
}

// ----- sources -----

pub fn OpiFTSource(label: &str, info: OpiFPluginInfo) -> OpiCStaticPluginSource {
    OpiCStaticPluginSource::OpiFNew(label).OpiFWithSymbol(OPI_PLUGIN_INFO_SYMBOL, info as *const c_void)
}

pub fn OpiFTPropagatorSource(label: &str, info: OpiFPluginInfo) -> OpiCStaticPluginSource {
    OpiFTSource(label, info).OpiFWithSymbol(
        OPI_PLUGIN_CREATE_PROPAGATOR_SYMBOL,
        OpiFTCreatePropagator as *const c_void,
    )
}

pub fn OpiFTTablePropagatorSource(label: &str) -> OpiCStaticPluginSource {
    OpiFTSource(label, OpiFTInfoTablePropagator).OpiFWithSymbol(
        OPI_PLUGIN_PROPAGATOR_TABLE_SYMBOL,
        OpiFTGetPropagatorTable as *const c_void,
    )
}

pub fn OpiFTQuerySource(label: &str) -> OpiCStaticPluginSource {
    OpiFTSource(label, OpiFTInfoQuery).OpiFWithSymbol(
        OPI_PLUGIN_CREATE_DISTANCE_QUERY_SYMBOL,
        OpiFTCreateQuery as *const c_void,
    )
}

pub fn OpiFTTableQuerySource(label: &str) -> OpiCStaticPluginSource {
    OpiFTSource(label, OpiFTInfoTableQuery).OpiFWithSymbol(
        OPI_PLUGIN_DISTANCE_QUERY_TABLE_SYMBOL,
        OpiFTGetQueryTable as *const c_void,
    )
}

pub fn OpiFTDetectionSource(label: &str) -> OpiCStaticPluginSource {
    OpiFTSource(label, OpiFTInfoDetection).OpiFWithSymbol(
        OPI_PLUGIN_CREATE_COLLISION_DETECTION_SYMBOL,
        OpiFTCreateDetection as *const c_void,
    )
}

pub fn OpiFTTableDetectionSource(label: &str) -> OpiCStaticPluginSource {
    OpiFTSource(label, OpiFTInfoTableDetection).OpiFWithSymbol(
        OPI_PLUGIN_COLLISION_DETECTION_TABLE_SYMBOL,
        OpiFTGetDetectionTable as *const c_void,
    )
}

/// Records `unload:<label>` when the host releases it.
pub struct OpiCTRecordingSource {
    inner: OpiCStaticPluginSource,
    label: String,
}

impl OpiCTRecordingSource {
    pub fn OpiFNew(label: &str, inner: OpiCStaticPluginSource) -> Box<Self> {
        Box::new(OpiCTRecordingSource {
            inner,
            label: label.to_string(),
        })
    }
}

impl OpiCPluginSource for OpiCTRecordingSource {
    fn path(&self) -> &Path {
        self.inner.path()
    }

    fn symbol(&self, name: &str) -> Option<opix::dynlib::OpiCRawSymbol> {
        self.inner.symbol(name)
    }
}

impl Drop for OpiCTRecordingSource {
    fn drop(&mut self) {
        OpiFTRecord(format!("unload:{}", self.label));
    }
}

// ----- GPU backend -----

/// Scriptable backend. Device handles are fake and must not be dereferenced.
pub struct OpiCTMockGpu {
    pub platform: OpiCGpuPlatform,
    pub capability: i32,
    pub devices: i32,
    pub current: i32,
    pub fail_init: bool,
}

impl OpiCTMockGpu {
    pub fn OpiFNew(platform: OpiCGpuPlatform, capability: i32, devices: i32) -> Box<Self> {
        Box::new(OpiCTMockGpu {
            platform,
            capability,
            devices,
            current: 0,
            fail_init: false,
        })
    }

    pub fn OpiFFailing(platform: OpiCGpuPlatform) -> Box<Self> {
        let mut gpu = Self::OpiFNew(platform, 0, 1);
        gpu.fail_init = true;
        gpu
    }
}

impl OpiCGpuSupport for OpiCTMockGpu {
    fn platform(&self) -> OpiCGpuPlatform {
        self.platform
    }

    fn init(&mut self) -> OpiCErrorCode {
        OpiFTRecord("gpu:init");
        if self.fail_init {
            OpiCErrorCode::InvalidDevice
        } else {
            OpiCErrorCode::Success
        }
    }

    fn shutdown(&mut self) {
        OpiFTRecord("gpu:shutdown");
    }

    fn select_device(&mut self, device: i32) {
        self.current = device;
    }

    fn current_device(&self) -> i32 {
        self.current
    }

    fn device_count(&self) -> i32 {
        self.devices
    }

    fn current_device_name(&self) -> String {
        format!("Mock {} device {}", self.platform, self.current)
    }

    fn current_device_capability(&self) -> i32 {
        self.capability
    }

    fn device_properties(&self, device: i32) -> Option<OpiCDeviceProperties> {
        if device < 0 || device >= self.devices {
            return None;
        }
        Some(OpiCDeviceProperties {
            name: format!("Mock {} device {}", self.platform, device),
            capability_major: self.capability,
            ..Default::default()
        })
    }

    fn allocate(&self, size: usize) -> OpiCDevicePtr {
        OpiFTRecord(format!("gpu:allocate:{}", size));
        OpiCDevicePtr(0x1000 as *mut c_void)
    }

    fn free(&self, _ptr: OpiCDevicePtr) {
        OpiFTRecord("gpu:free");
    }

    unsafe fn copy(&self, _dst: *mut c_void, _src: *const c_void, size: usize, direction: OpiCCopyDirection) {
        OpiFTRecord(format!("gpu:copy:{:?}:{}", direction, size));
    }

    fn synchronize(&self) {
        OpiFTRecord("gpu:synchronize");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for OpiCTMockGpu {
    fn drop(&mut self) {
        OpiFTRecord("gpu:drop");
    }
}
