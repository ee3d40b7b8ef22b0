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

//! # Flat Function Tables
//!
//! The C-level construction style. A plugin exports an accessor returning
//! a static `#[repr(C)]` table: a common [`OpiCModuleTable`] header
//! (create/destroy of an opaque state pointer, optional enable, disable
//! and config hooks) followed by the category's operations. The adapters
//! in this file own one state pointer each and implement the module
//! traits by forwarding to the table.
//!
//! Operations return raw [`OpiCErrorCode`] values.
//!
//! ## Pair output
//!
//! Pair-producing operations write into a host buffer of `capacity`
//! entries and store the number of pairs found in `*written`. When that
//! number exceeds the capacity, nothing usable was written; the host grows
//! the buffer to `*written` entries and calls once more.

use std::ffi::{c_void, CString};
use std::os::raw::{c_char, c_int};
use std::path::Path;

use crate::errors::{OpiCErrorCode, OpiError, Result};
use crate::module::base::{OpiCModule, OpiCModuleState};
use crate::module::detection::OpiCCollisionDetection;
use crate::module::propagator::OpiCPropagator;
use crate::module::query::OpiCDistanceQuery;
use crate::population::{OpiCIndexPair, OpiCOrbit, OpiCPopulation};

/// Layout generation of the tables in this file.
pub const OPI_PLUGIN_TABLE_ABI_VERSION: u32 = 1;

const OPI_TABLE_INITIAL_PAIR_CAPACITY: usize = 64;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct OpiCModuleTable {
    pub abi_version: u32,
    pub create: unsafe extern "C" fn() -> *mut c_void,
    pub destroy: unsafe extern "C" fn(state: *mut c_void),
    pub enable: Option<unsafe extern "C" fn(state: *mut c_void) -> c_int>,
    pub disable: Option<unsafe extern "C" fn(state: *mut c_void) -> c_int>,
    pub load_config: Option<unsafe extern "C" fn(state: *mut c_void, path: *const c_char) -> c_int>,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct OpiCPropagatorTable {
    pub base: OpiCModuleTable,
    pub propagate: unsafe extern "C" fn(
        state: *mut c_void,
        orbits: *mut OpiCOrbit,
        count: usize,
        julian_day: f64,
        dt: f32,
    ) -> c_int,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct OpiCDistanceQueryTable {
    pub base: OpiCModuleTable,
    pub rebuild: unsafe extern "C" fn(state: *mut c_void, orbits: *const OpiCOrbit, count: usize) -> c_int,
    pub query_cubic_pairs: unsafe extern "C" fn(
        state: *mut c_void,
        orbits: *const OpiCOrbit,
        count: usize,
        cube_size: f32,
        pairs: *mut OpiCIndexPair,
        capacity: usize,
        written: *mut usize,
    ) -> c_int,
}

/// Detection over the C ABI has no access to a distance query; the
/// adapter ignores the one passed by the caller.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct OpiCCollisionDetectionTable {
    pub base: OpiCModuleTable,
    pub detect_pairs: unsafe extern "C" fn(
        state: *mut c_void,
        orbits: *const OpiCOrbit,
        count: usize,
        time_passed: f32,
        pairs: *mut OpiCIndexPair,
        capacity: usize,
        written: *mut usize,
    ) -> c_int,
}

pub type OpiFGetPropagatorTable = unsafe extern "C" fn() -> *const OpiCPropagatorTable;
pub type OpiFGetDistanceQueryTable = unsafe extern "C" fn() -> *const OpiCDistanceQueryTable;
pub type OpiFGetCollisionDetectionTable = unsafe extern "C" fn() -> *const OpiCCollisionDetectionTable;

/// One plugin-side state object. Destroyed through the table on drop.
struct OpiCTableInstance {
    base: OpiCModuleTable,
    handle: *mut c_void,
}

impl OpiCTableInstance {
    /// # Safety
    ///
    /// The function pointers in `base` must be valid for as long as the
    /// instance lives.
    unsafe fn create(base: OpiCModuleTable, plugin_path: &Path) -> Result<Self> {
        if base.abi_version != OPI_PLUGIN_TABLE_ABI_VERSION {
            return Err(OpiError::malformed(
                plugin_path.to_string_lossy(),
                format!(
                    "function table version {} does not match host version {}",
                    base.abi_version, OPI_PLUGIN_TABLE_ABI_VERSION
                ),
            ));
        }
        let handle = (base.create)();
        if handle.is_null() {
            return Err(OpiError::malformed(
                plugin_path.to_string_lossy(),
                "function table create() returned null",
            ));
        }
        Ok(OpiCTableInstance { base, handle })
    }

    fn enable(&mut self) -> OpiCErrorCode {
        match self.base.enable {
            // SAFETY: `handle` came from this table's `create`.
            Some(enable) => OpiCErrorCode::OpiFFromRaw(unsafe { enable(self.handle) }),
            None => OpiCErrorCode::Success,
        }
    }

    fn disable(&mut self) -> OpiCErrorCode {
        match self.base.disable {
            // SAFETY: as above.
            Some(disable) => OpiCErrorCode::OpiFFromRaw(unsafe { disable(self.handle) }),
            None => OpiCErrorCode::Success,
        }
    }

    fn load_config(&mut self, path: &Path) -> OpiCErrorCode {
        let load_config = match self.base.load_config {
            Some(load_config) => load_config,
            None => return OpiCErrorCode::Success,
        };
        let c_path = match CString::new(path.to_string_lossy().into_owned()) {
            Ok(c_path) => c_path,
            Err(_) => return OpiCErrorCode::InvalidArgument,
        };
        // SAFETY: `c_path` outlives the call.
        OpiCErrorCode::OpiFFromRaw(unsafe { load_config(self.handle, c_path.as_ptr()) })
    }
}

impl Drop for OpiCTableInstance {
    fn drop(&mut self) {
        // SAFETY: `handle` came from `create` and is destroyed once.
        unsafe { (self.base.destroy)(self.handle) };
    }
}

/// Runs a pair-producing table operation, growing `pairs` once if the
/// plugin reports more pairs than fit.
fn collect_pairs(
    pairs: &mut Vec<OpiCIndexPair>,
    mut call: impl FnMut(*mut OpiCIndexPair, usize, &mut usize) -> c_int,
) -> OpiCErrorCode {
    let mut capacity = pairs.capacity().max(OPI_TABLE_INITIAL_PAIR_CAPACITY);
    for _ in 0..2 {
        pairs.clear();
        pairs.reserve(capacity);
        let mut written = 0usize;
        let code = OpiCErrorCode::OpiFFromRaw(call(pairs.as_mut_ptr(), capacity, &mut written));
        if !code.OpiFIsSuccess() {
            return code;
        }
        if written <= capacity {
            // SAFETY: the plugin initialized `written` entries of a buffer
            // with room for `capacity`.
            unsafe { pairs.set_len(written) };
            return OpiCErrorCode::Success;
        }
        capacity = written;
    }
    log::warn!(
        "opi.table.pairs_overflow: plugin kept reporting more pairs than the buffer holds - capacity={}",
        capacity
    );
    OpiCErrorCode::UnknownError
}

macro_rules! table_module_impl {
    ($adapter:ty) => {
        impl OpiCModule for $adapter {
            fn state(&self) -> &OpiCModuleState {
                &self.state
            }

            fn state_mut(&mut self) -> &mut OpiCModuleState {
                &mut self.state
            }

            fn on_enable(&mut self) -> OpiCErrorCode {
                self.instance.enable()
            }

            fn on_disable(&mut self) -> OpiCErrorCode {
                self.instance.disable()
            }

            fn load_config_file(&mut self, path: &Path) -> OpiCErrorCode {
                self.instance.load_config(path)
            }
        }
    };
}

pub struct OpiCTablePropagator {
    state: OpiCModuleState,
    propagate: unsafe extern "C" fn(*mut c_void, *mut OpiCOrbit, usize, f64, f32) -> c_int,
    instance: OpiCTableInstance,
}

impl OpiCTablePropagator {
    /// Creates the plugin-side state.
    ///
    /// # Safety
    ///
    /// The table's function pointers must stay valid for the adapter's
    /// lifetime, i.e. the library exporting them must outlive it.
    #[allow(non_snake_case)]
    pub unsafe fn OpiFNew(table: &OpiCPropagatorTable, state: OpiCModuleState, plugin_path: &Path) -> Result<Self> {
        Ok(OpiCTablePropagator {
            state,
            propagate: table.propagate,
            instance: OpiCTableInstance::create(table.base, plugin_path)?,
        })
    }
}

table_module_impl!(OpiCTablePropagator);

impl OpiCPropagator for OpiCTablePropagator {
    fn run_propagation(&mut self, population: &mut OpiCPopulation, julian_day: f64, dt: f32) -> OpiCErrorCode {
        let orbits = population.OpiFOrbitsMut();
        // SAFETY: the pointer and length describe a live, exclusive slice.
        let code = unsafe {
            (self.propagate)(
                self.instance.handle,
                orbits.as_mut_ptr(),
                orbits.len(),
                julian_day,
                dt,
            )
        };
        OpiCErrorCode::OpiFFromRaw(code)
    }
}

pub struct OpiCTableDistanceQuery {
    state: OpiCModuleState,
    table: OpiCDistanceQueryTable,
    instance: OpiCTableInstance,
}

impl OpiCTableDistanceQuery {
    /// # Safety
    ///
    /// See [`OpiCTablePropagator::OpiFNew`].
    #[allow(non_snake_case)]
    pub unsafe fn OpiFNew(table: &OpiCDistanceQueryTable, state: OpiCModuleState, plugin_path: &Path) -> Result<Self> {
        Ok(OpiCTableDistanceQuery {
            state,
            table: *table,
            instance: OpiCTableInstance::create(table.base, plugin_path)?,
        })
    }
}

table_module_impl!(OpiCTableDistanceQuery);

impl OpiCDistanceQuery for OpiCTableDistanceQuery {
    fn rebuild(&mut self, population: &OpiCPopulation) -> OpiCErrorCode {
        let orbits = population.OpiFOrbits();
        // SAFETY: read-only view of a live slice.
        let code = unsafe { (self.table.rebuild)(self.instance.handle, orbits.as_ptr(), orbits.len()) };
        OpiCErrorCode::OpiFFromRaw(code)
    }

    fn query_cubic_pairs(
        &mut self,
        population: &OpiCPopulation,
        cube_size: f32,
        pairs: &mut Vec<OpiCIndexPair>,
    ) -> OpiCErrorCode {
        let orbits = population.OpiFOrbits();
        let query = self.table.query_cubic_pairs;
        let handle = self.instance.handle;
        collect_pairs(pairs, |out, capacity, written| {
            // SAFETY: `out` has room for `capacity` pairs.
            unsafe {
                query(
                    handle,
                    orbits.as_ptr(),
                    orbits.len(),
                    cube_size,
                    out,
                    capacity,
                    written,
                )
            }
        })
    }
}

pub struct OpiCTableCollisionDetection {
    state: OpiCModuleState,
    detect: unsafe extern "C" fn(*mut c_void, *const OpiCOrbit, usize, f32, *mut OpiCIndexPair, usize, *mut usize) -> c_int,
    instance: OpiCTableInstance,
}

impl OpiCTableCollisionDetection {
    /// # Safety
    ///
    /// See [`OpiCTablePropagator::OpiFNew`].
    #[allow(non_snake_case)]
    pub unsafe fn OpiFNew(
        table: &OpiCCollisionDetectionTable,
        state: OpiCModuleState,
        plugin_path: &Path,
    ) -> Result<Self> {
        Ok(OpiCTableCollisionDetection {
            state,
            detect: table.detect_pairs,
            instance: OpiCTableInstance::create(table.base, plugin_path)?,
        })
    }
}

table_module_impl!(OpiCTableCollisionDetection);

impl OpiCCollisionDetection for OpiCTableCollisionDetection {
    fn detect_pairs(
        &mut self,
        population: &OpiCPopulation,
        _query: Option<&mut dyn OpiCDistanceQuery>,
        pairs: &mut Vec<OpiCIndexPair>,
        time_passed: f32,
    ) -> OpiCErrorCode {
        let orbits = population.OpiFOrbits();
        let detect = self.detect;
        let handle = self.instance.handle;
        collect_pairs(pairs, |out, capacity, written| {
            // SAFETY: `out` has room for `capacity` pairs.
            unsafe {
                detect(
                    handle,
                    orbits.as_ptr(),
                    orbits.len(),
                    time_passed,
                    out,
                    capacity,
                    written,
                )
            }
        })
    }
}
