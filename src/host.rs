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

//! # Host
//!
//! The owner of everything loaded at runtime: plugin descriptors (and with
//! them the libraries), the five typed object registries, the optional GPU
//! backend and the error-reporting state.
//!
//! ## Loading
//!
//! [`OpiCHost::OpiFLoadPlugins`] first resolves a GPU backend for the
//! requested platform (only if none is active yet), then scans the plugin
//! directory. Every file directly inside it whose name ends in the
//! platform's library suffix is opened, described, gated and, if accepted,
//! instantiated and registered. A broken or incompatible file is logged and
//! skipped; it never aborts the scan.
//!
//! ## Host link
//!
//! Registered objects receive an [`OpiCHostRef`], a non-owning handle to
//! the host's shared state. Through it they reach the GPU backend and the
//! error channel. Once the host is gone the handle resolves to nothing and
//! every query returns a neutral value.
//!
//! ## Teardown
//!
//! Dropping the host disables and destroys propagators, then distance
//! queries, then collision detections, then perturbation modules and
//! integrators. Only then is the GPU backend shut down, and only after
//! that are the plugin libraries unloaded.
//!
//! ## Threading
//!
//! The host is single threaded and neither `Send` nor `Sync`. An
//! application that drives propagators from several threads must confine
//! the host, and every object it owns, to one of them.

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::OpiCHostConfig;
use crate::dynlib::OpiCDynamicLibrary;
use crate::errors::{OpiCErrorCode, OpiError};
use crate::gpu::{OpiCCopyDirection, OpiCDevicePtr, OpiCDeviceProperties, OpiCGpuBackend, OpiCGpuPlatform, OpiCGpuSupport};
use crate::log::OpiFInitLogging;
use crate::module::base::OpiCModule;
use crate::module::custom::OpiCCustomPropagator;
use crate::module::detection::OpiCCollisionDetection;
use crate::module::perturbation::{OpiCPerturbationModule, OpiCPropagatorIntegrator};
use crate::module::propagator::OpiCPropagator;
use crate::module::query::OpiCDistanceQuery;
use crate::plugin::category::OpiCPluginCategory;
use crate::plugin::descriptor::{OpiCPluginDescriptor, OpiCPluginStatus, OpiFSiblingConfigFile};
use crate::plugin::factory::{OpiCLoadedObject, OpiFInstantiate};
use crate::plugin::gate::{OpiCCompatibilityGate, OpiCSupportDecision};
use crate::plugin::source::OpiCPluginSource;

/// Device name reported when no GPU backend is active.
pub const OPI_NO_GPU_DEVICE_NAME: &str = "No GPU device available.";

static NEXT_HOST_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a host, passed to error callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpiCHostId(u64);

impl OpiCHostId {
    fn next() -> Self {
        OpiCHostId(NEXT_HOST_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[allow(non_snake_case)]
    pub fn OpiFValue(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OpiCHostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host-{}", self.0)
    }
}

/// Error callback. User data is whatever the closure captures.
pub type OpiCErrorCallback = Box<dyn Fn(OpiCHostId, OpiCErrorCode)>;

/// State reachable from both the host and the links it hands out.
struct OpiCHostShared {
    id: OpiCHostId,
    gpu: RefCell<Option<OpiCGpuBackend>>,
    last_error: Cell<OpiCErrorCode>,
    error_callback: RefCell<Option<OpiCErrorCallback>>,
}

impl OpiCHostShared {
    fn send_error(&self, code: OpiCErrorCode) {
        if code.OpiFIsSuccess() {
            return;
        }
        self.last_error.set(code);
        log::debug!("opi.host.error: error reported - host={}, code={}", self.id, code);

        match self.error_callback.try_borrow() {
            Ok(callback) => {
                if let Some(callback) = callback.as_ref() {
                    callback(self.id, code);
                }
            }
            Err(_) => log::warn!(
                "opi.host.callback_reentered: error raised from inside the error callback, not forwarded - host={}, code={}",
                self.id,
                code
            ),
        }
    }

    fn with_gpu<R>(&self, f: impl FnOnce(&dyn OpiCGpuSupport) -> R) -> Option<R> {
        let backend = self.gpu.try_borrow().ok()?;
        backend.as_ref().map(|backend| f(backend.OpiFSupport()))
    }

    fn with_gpu_mut<R>(&self, f: impl FnOnce(&mut dyn OpiCGpuSupport) -> R) -> Option<R> {
        let mut backend = self.gpu.try_borrow_mut().ok()?;
        backend.as_mut().map(|backend| f(backend.OpiFSupportMut()))
    }

    fn gpu_platform(&self) -> OpiCGpuPlatform {
        self.with_gpu(|gpu| gpu.platform()).unwrap_or_default()
    }

    fn gpu_device_count(&self) -> i32 {
        self.with_gpu(|gpu| gpu.device_count()).unwrap_or(0)
    }

    fn gpu_capability(&self) -> i32 {
        self.with_gpu(|gpu| gpu.current_device_capability()).unwrap_or(0)
    }
}

/// Non-owning link from a plugin object back to its host.
#[derive(Clone, Default)]
pub struct OpiCHostRef {
    shared: Weak<OpiCHostShared>,
}

impl fmt::Debug for OpiCHostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpiCHostRef").field("host", &self.OpiFId()).finish()
    }
}

impl OpiCHostRef {
    /// A link that never resolves. Useful for objects used without a host.
    #[allow(non_snake_case)]
    pub fn OpiFDetached() -> Self {
        OpiCHostRef::default()
    }

    #[allow(non_snake_case)]
    pub fn OpiFId(&self) -> Option<OpiCHostId> {
        self.shared.upgrade().map(|shared| shared.id)
    }

    #[allow(non_snake_case)]
    pub fn OpiFIsAlive(&self) -> bool {
        self.shared.strong_count() > 0
    }

    #[allow(non_snake_case)]
    pub fn OpiFSendError(&self, code: OpiCErrorCode) {
        if let Some(shared) = self.shared.upgrade() {
            shared.send_error(code);
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetLastError(&self) -> OpiCErrorCode {
        self.shared
            .upgrade()
            .map(|shared| shared.last_error.get())
            .unwrap_or_default()
    }

    /// Runs `f` against the active backend. `None` when there is no
    /// backend, the host is gone, or the backend is in use by an enclosing
    /// call.
    #[allow(non_snake_case)]
    pub fn OpiFWithGpuSupport<R>(&self, f: impl FnOnce(&dyn OpiCGpuSupport) -> R) -> Option<R> {
        self.shared.upgrade()?.with_gpu(f)
    }

    #[allow(non_snake_case)]
    pub fn OpiFWithGpuSupportMut<R>(&self, f: impl FnOnce(&mut dyn OpiCGpuSupport) -> R) -> Option<R> {
        self.shared.upgrade()?.with_gpu_mut(f)
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetGpuPlatform(&self) -> OpiCGpuPlatform {
        self.shared
            .upgrade()
            .map(|shared| shared.gpu_platform())
            .unwrap_or_default()
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetCurrentGpuDeviceCapability(&self) -> i32 {
        self.shared.upgrade().map(|shared| shared.gpu_capability()).unwrap_or(0)
    }

    /// Device allocation; null without a backend.
    #[allow(non_snake_case)]
    pub fn OpiFGpuAllocate(&self, size: usize) -> OpiCDevicePtr {
        self.OpiFWithGpuSupport(|gpu| gpu.allocate(size))
            .unwrap_or_else(OpiCDevicePtr::OpiFNull)
    }

    #[allow(non_snake_case)]
    pub fn OpiFGpuFree(&self, ptr: OpiCDevicePtr) {
        if ptr.OpiFIsNull() {
            return;
        }
        self.OpiFWithGpuSupport(|gpu| gpu.free(ptr));
    }

    /// Copies between host and device memory. Returns `false` without a
    /// backend.
    ///
    /// # Safety
    ///
    /// Same contract as [`OpiCGpuSupport::copy`].
    #[allow(non_snake_case)]
    pub unsafe fn OpiFGpuCopy(
        &self,
        dst: *mut c_void,
        src: *const c_void,
        size: usize,
        direction: OpiCCopyDirection,
    ) -> bool {
        self.OpiFWithGpuSupport(|gpu| gpu.copy(dst, src, size, direction))
            .is_some()
    }

    #[allow(non_snake_case)]
    pub fn OpiFGpuSynchronize(&self) {
        self.OpiFWithGpuSupport(|gpu| gpu.synchronize());
    }
}

pub struct OpiCHost {
    shared: Rc<OpiCHostShared>,
    config: OpiCHostConfig,
    plugins: Vec<OpiCPluginDescriptor>,
    propagators: Vec<Box<dyn OpiCPropagator>>,
    modules: Vec<Box<dyn OpiCPerturbationModule>>,
    integrators: Vec<Box<dyn OpiCPropagatorIntegrator>>,
    queries: Vec<Box<dyn OpiCDistanceQuery>>,
    detections: Vec<Box<dyn OpiCCollisionDetection>>,
}

impl fmt::Debug for OpiCHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpiCHost")
            .field("id", &self.shared.id)
            .field("platform", &self.shared.gpu_platform())
            .field("plugins", &self.plugins.len())
            .field("propagators", &self.propagators.len())
            .field("modules", &self.modules.len())
            .field("integrators", &self.integrators.len())
            .field("queries", &self.queries.len())
            .field("detections", &self.detections.len())
            .finish()
    }
}

impl Default for OpiCHost {
    fn default() -> Self {
        OpiCHost::OpiFNew()
    }
}

impl OpiCHost {
    #[allow(non_snake_case)]
    pub fn OpiFNew() -> Self {
        let shared = Rc::new(OpiCHostShared {
            id: OpiCHostId::next(),
            gpu: RefCell::new(None),
            last_error: Cell::new(OpiCErrorCode::Success),
            error_callback: RefCell::new(None),
        });
        log::debug!("opi.host.created: host created - host={}", shared.id);

        OpiCHost {
            shared,
            config: OpiCHostConfig::default(),
            plugins: Vec::new(),
            propagators: Vec::new(),
            modules: Vec::new(),
            integrators: Vec::new(),
            queries: Vec::new(),
            detections: Vec::new(),
        }
    }

    /// Creates a host that uses `config` for [`Self::OpiFLoadConfiguredPlugins`]
    /// and device selection. Installs the configured logger if no logger
    /// is installed yet.
    #[allow(non_snake_case)]
    pub fn OpiFWithConfig(config: OpiCHostConfig) -> Self {
        if let Some(log_config) = config.log.as_ref() {
            OpiFInitLogging(log_config);
        }
        let mut host = OpiCHost::OpiFNew();
        host.config = config;
        host
    }

    /// Installs a backend linked into the application and initializes it.
    ///
    /// The backend is fixed once active: if one is already installed, or
    /// the new one fails to initialize, `support` is discarded.
    #[allow(non_snake_case)]
    pub fn OpiFWithGpuSupport(self, support: Box<dyn OpiCGpuSupport>) -> Self {
        if self.OpiFHasGpuBackend() {
            log::warn!(
                "opi.gpu.already_active: ignoring second GPU backend - host={}, active={}",
                self.shared.id,
                self.shared.gpu_platform()
            );
            return self;
        }
        self.activate_backend(OpiCGpuBackend::OpiFFromSupport(support));
        self
    }

    #[allow(non_snake_case)]
    pub fn OpiFId(&self) -> OpiCHostId {
        self.shared.id
    }

    #[allow(non_snake_case)]
    pub fn OpiFConfig(&self) -> &OpiCHostConfig {
        &self.config
    }

    /// Link handed to objects registered with this host.
    #[allow(non_snake_case)]
    pub fn OpiFRef(&self) -> OpiCHostRef {
        OpiCHostRef {
            shared: Rc::downgrade(&self.shared),
        }
    }

    // ----- error channel -----

    /// Records `code` and forwards it to the callback. Success is ignored.
    #[allow(non_snake_case)]
    pub fn OpiFSendError(&self, code: OpiCErrorCode) {
        self.shared.send_error(code);
    }

    /// Most recent non-success code. Not cleared by reading.
    #[allow(non_snake_case)]
    pub fn OpiFGetLastError(&self) -> OpiCErrorCode {
        self.shared.last_error.get()
    }

    /// Replaces the error callback. Data the callback needs is captured by
    /// the closure.
    #[allow(non_snake_case)]
    pub fn OpiFSetErrorCallback(&self, callback: impl Fn(OpiCHostId, OpiCErrorCode) + 'static) {
        match self.shared.error_callback.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(Box::new(callback)),
            Err(_) => log::warn!(
                "opi.host.callback_busy: cannot replace the error callback while it runs - host={}",
                self.shared.id
            ),
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFClearErrorCallback(&self) {
        if let Ok(mut slot) = self.shared.error_callback.try_borrow_mut() {
            slot.take();
        }
    }

    // ----- loading -----

    /// Loads plugins from the configured directory with the configured
    /// platform.
    #[allow(non_snake_case)]
    pub fn OpiFLoadConfiguredPlugins(&mut self) -> OpiCErrorCode {
        let plugin_dir = self.config.plugin_dir.clone();
        let platform = self.config.platform;
        self.OpiFLoadPlugins(plugin_dir, platform)
    }

    /// Resolves a GPU backend for `platform` and loads every plugin found
    /// directly inside `plugin_dir`.
    ///
    /// Returns `DirectoryNotFound` (also sent to the error channel) when the
    /// directory cannot be read; otherwise `Success`, even if nothing was
    /// loaded.
    #[allow(non_snake_case)]
    pub fn OpiFLoadPlugins(&mut self, plugin_dir: impl AsRef<Path>, platform: OpiCGpuPlatform) -> OpiCErrorCode {
        let plugin_dir = plugin_dir.as_ref();
        log::info!(
            "opi.host.load: loading plugins - host={}, dir={}, platform={}",
            self.shared.id,
            plugin_dir.display(),
            platform
        );

        if !self.OpiFHasGpuBackend() && platform != OpiCGpuPlatform::None {
            self.resolve_gpu_backend(plugin_dir, platform);
        }

        let entries = match fs::read_dir(plugin_dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(
                    "opi.host.dir_missing: cannot open plugin directory - dir={}, error={}",
                    plugin_dir.display(),
                    e
                );
                self.OpiFSendError(OpiCErrorCode::DirectoryNotFound);
                return OpiCErrorCode::DirectoryNotFound;
            }
        };

        let suffix = OpiCDynamicLibrary::OpiFPlatformSuffix();
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().ends_with(suffix))
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();

        log::debug!(
            "opi.host.scan: plugin candidates found - dir={}, count={}",
            plugin_dir.display(),
            candidates.len()
        );

        for path in candidates {
            match OpiCDynamicLibrary::OpiFOpen(&path, false) {
                Ok(library) => {
                    let config_file = OpiFSiblingConfigFile(&path);
                    self.OpiFLoadPluginSource(Box::new(library), config_file);
                }
                Err(e) => log::warn!(
                    "opi.host.open_failed: skipping file that is not a loadable library - path={}, error={}",
                    path.display(),
                    e
                ),
            }
        }

        log::info!(
            "opi.host.loaded: plugin loading finished - host={}, plugins={}, propagators={}, queries={}, detections={}",
            self.shared.id,
            self.plugins.len(),
            self.propagators.len(),
            self.queries.len(),
            self.detections.len()
        );
        OpiCErrorCode::Success
    }

    /// Describes, gates, instantiates and registers one plugin.
    ///
    /// Sources without readable metadata are dropped, unloading them. Every
    /// other source is kept until teardown, whatever its outcome, and the
    /// outcome is returned.
    #[allow(non_snake_case)]
    pub fn OpiFLoadPluginSource(
        &mut self,
        source: Box<dyn OpiCPluginSource>,
        config_file: Option<PathBuf>,
    ) -> OpiCPluginStatus {
        let mut descriptor = OpiCPluginDescriptor::OpiFFromSource(source);
        if !descriptor.OpiFIsValid() {
            return descriptor.OpiFStatus().clone();
        }
        descriptor.OpiFSetConfigFile(config_file);

        log::info!(
            "opi.plugin.found: found {} - name={}, version={}, path={}",
            descriptor.OpiFCategory(),
            descriptor.OpiFName(),
            descriptor.OpiFVersion(),
            descriptor.OpiFPath().display()
        );

        let status = self.load_descriptor(&descriptor);
        descriptor.OpiFSetStatus(status.clone());
        self.plugins.push(descriptor);
        status
    }

    fn load_descriptor(&mut self, descriptor: &OpiCPluginDescriptor) -> OpiCPluginStatus {
        let category = descriptor.OpiFCategory();
        if !category.OpiFIsInstantiable() {
            log::info!(
                "opi.plugin.skipped: plugin type is not loaded by the host - name={}, type={}",
                descriptor.OpiFName(),
                category
            );
            return OpiCPluginStatus::Skipped(format!("{} is not instantiated by the host", category));
        }

        let gate = OpiCCompatibilityGate::OpiFNew(self.shared.gpu_platform(), self.shared.gpu_capability());
        if let OpiCSupportDecision::Rejected(reason) = gate.OpiFCheck(descriptor) {
            return OpiCPluginStatus::Rejected(reason);
        }

        let object = match OpiFInstantiate(descriptor, &self.OpiFRef()) {
            Ok(Some(object)) => object,
            Ok(None) => return OpiCPluginStatus::Skipped(format!("no object produced for {}", category)),
            Err(e) => {
                log::warn!(
                    "opi.plugin.instantiate_failed: cannot create plugin object - name={}, error={}",
                    descriptor.OpiFName(),
                    e
                );
                return OpiCPluginStatus::Failed(e.to_string());
            }
        };

        log::info!(
            "opi.plugin.registered: plugin object registered - name={}, type={}",
            object.OpiFName(),
            category
        );
        let config_file = descriptor.OpiFConfigFile();
        match object {
            OpiCLoadedObject::Propagator(mut object) => {
                self.prepare(object.as_mut(), config_file);
                self.propagators.push(object);
            }
            OpiCLoadedObject::DistanceQuery(mut object) => {
                self.prepare(object.as_mut(), config_file);
                self.queries.push(object);
            }
            OpiCLoadedObject::CollisionDetection(mut object) => {
                self.prepare(object.as_mut(), config_file);
                self.detections.push(object);
            }
        }
        OpiCPluginStatus::Registered
    }

    /// Host link, configuration file, then enable.
    fn prepare<T: OpiCModule + ?Sized>(&self, object: &mut T, config_file: Option<&Path>) {
        object.attach_host(self.OpiFRef());
        if let Some(config_file) = config_file {
            let code = object.load_config_file(config_file);
            if !code.OpiFIsSuccess() {
                log::warn!(
                    "opi.plugin.config_failed: plugin rejected its configuration file - name={}, path={}, code={}",
                    object.name(),
                    config_file.display(),
                    code
                );
            }
        }
        object.enable();
    }

    fn resolve_gpu_backend(&self, plugin_dir: &Path, platform: OpiCGpuPlatform) {
        match OpiCGpuBackend::OpiFLoad(plugin_dir, platform) {
            Ok(backend) => {
                if backend.OpiFPlatform() != platform {
                    log::warn!(
                        "opi.gpu.platform_mismatch: support library reports another platform - requested={}, reported={}",
                        platform,
                        backend.OpiFPlatform()
                    );
                }
                self.activate_backend(backend);
            }
            Err(OpiError::Library { path, message }) => log::warn!(
                "opi.gpu.library_missing: cannot load GPU support library, check your path and make sure your {} drivers are installed correctly - path={}, error={}",
                platform.OpiFFrameworkName(),
                path,
                message
            ),
            Err(e) => log::warn!(
                "opi.gpu.load_failed: unable to use GPU support library, continuing without GPU - platform={}, error={}",
                platform,
                e
            ),
        }
    }

    /// Initializes `backend`, applies the preferred device and stores it.
    fn activate_backend(&self, mut backend: OpiCGpuBackend) {
        let code = backend.OpiFInit();
        if !code.OpiFIsSuccess() {
            log::warn!(
                "opi.gpu.init_failed: GPU backend failed to initialize, continuing without GPU - platform={}, code={}",
                backend.OpiFPlatform(),
                code
            );
            backend.OpiFShutdown();
            return;
        }

        if let Some(device) = self.config.device {
            let count = backend.OpiFSupport().device_count();
            if (0..count).contains(&device) {
                backend.OpiFSupportMut().select_device(device);
            } else {
                log::warn!(
                    "opi.gpu.device_invalid: configured device does not exist - device={}, count={}",
                    device,
                    count
                );
            }
        }

        log::info!(
            "opi.gpu.active: GPU backend active - platform={}, device={}, capability={}",
            backend.OpiFPlatform(),
            backend.OpiFSupport().current_device_name(),
            backend.OpiFSupport().current_device_capability()
        );

        match self.shared.gpu.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(backend),
            Err(_) => {
                log::error!("opi.gpu.busy: GPU slot in use, discarding backend - host={}", self.shared.id);
                backend.OpiFShutdown();
            }
        }
    }

    // ----- in-process registration -----

    #[allow(non_snake_case)]
    pub fn OpiFRegisterPropagator(&mut self, mut propagator: Box<dyn OpiCPropagator>) {
        self.prepare(propagator.as_mut(), None);
        self.propagators.push(propagator);
    }

    #[allow(non_snake_case)]
    pub fn OpiFRegisterDistanceQuery(&mut self, mut query: Box<dyn OpiCDistanceQuery>) {
        self.prepare(query.as_mut(), None);
        self.queries.push(query);
    }

    #[allow(non_snake_case)]
    pub fn OpiFRegisterCollisionDetection(&mut self, mut detection: Box<dyn OpiCCollisionDetection>) {
        self.prepare(detection.as_mut(), None);
        self.detections.push(detection);
    }

    #[allow(non_snake_case)]
    pub fn OpiFRegisterPerturbationModule(&mut self, mut module: Box<dyn OpiCPerturbationModule>) {
        self.prepare(module.as_mut(), None);
        self.modules.push(module);
    }

    #[allow(non_snake_case)]
    pub fn OpiFRegisterIntegrator(&mut self, mut integrator: Box<dyn OpiCPropagatorIntegrator>) {
        self.prepare(integrator.as_mut(), None);
        self.integrators.push(integrator);
    }

    /// Registers an empty custom propagator and returns it for composition.
    #[allow(non_snake_case)]
    pub fn OpiFCreateCustomPropagator(&mut self, name: &str) -> Option<&mut OpiCCustomPropagator> {
        self.OpiFRegisterPropagator(Box::new(OpiCCustomPropagator::OpiFNew(name)));
        self.propagators.last_mut().and_then(|propagator| propagator.as_custom_mut())
    }

    // ----- registries -----

    #[allow(non_snake_case)]
    pub fn OpiFGetPlugins(&self) -> &[OpiCPluginDescriptor] {
        &self.plugins
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetPluginTypeString(category: OpiCPluginCategory) -> String {
        category.to_string()
    }

    /// Validates a caller-supplied index, reporting `IndexRange` on failure.
    fn checked_index(&self, index: i32, len: usize) -> Option<usize> {
        match usize::try_from(index) {
            Ok(index) if index < len => Some(index),
            _ => {
                log::warn!(
                    "opi.host.index_range: registry index out of range - index={}, count={}",
                    index,
                    len
                );
                self.OpiFSendError(OpiCErrorCode::IndexRange);
                None
            }
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetPropagatorCount(&self) -> i32 {
        self.propagators.len() as i32
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetPropagator(&self, name: &str) -> Option<&dyn OpiCPropagator> {
        self.propagators.iter().find(|p| p.name() == name).map(|p| p.as_ref())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetPropagatorMut(&mut self, name: &str) -> Option<&mut dyn OpiCPropagator> {
        for propagator in self.propagators.iter_mut() {
            if propagator.name() == name {
                return Some(propagator.as_mut());
            }
        }
        None
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetPropagatorAt(&self, index: i32) -> Option<&dyn OpiCPropagator> {
        let index = self.checked_index(index, self.propagators.len())?;
        Some(self.propagators[index].as_ref())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetPropagatorAtMut(&mut self, index: i32) -> Option<&mut dyn OpiCPropagator> {
        let index = self.checked_index(index, self.propagators.len())?;
        Some(self.propagators[index].as_mut())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetDistanceQueryCount(&self) -> i32 {
        self.queries.len() as i32
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetDistanceQuery(&self, name: &str) -> Option<&dyn OpiCDistanceQuery> {
        self.queries.iter().find(|q| q.name() == name).map(|q| q.as_ref())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetDistanceQueryMut(&mut self, name: &str) -> Option<&mut dyn OpiCDistanceQuery> {
        for query in self.queries.iter_mut() {
            if query.name() == name {
                return Some(query.as_mut());
            }
        }
        None
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetDistanceQueryAt(&self, index: i32) -> Option<&dyn OpiCDistanceQuery> {
        let index = self.checked_index(index, self.queries.len())?;
        Some(self.queries[index].as_ref())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetDistanceQueryAtMut(&mut self, index: i32) -> Option<&mut dyn OpiCDistanceQuery> {
        let index = self.checked_index(index, self.queries.len())?;
        Some(self.queries[index].as_mut())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetCollisionDetectionCount(&self) -> i32 {
        self.detections.len() as i32
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetCollisionDetection(&self, name: &str) -> Option<&dyn OpiCCollisionDetection> {
        self.detections.iter().find(|d| d.name() == name).map(|d| d.as_ref())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetCollisionDetectionMut(&mut self, name: &str) -> Option<&mut dyn OpiCCollisionDetection> {
        for detection in self.detections.iter_mut() {
            if detection.name() == name {
                return Some(detection.as_mut());
            }
        }
        None
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetCollisionDetectionAt(&self, index: i32) -> Option<&dyn OpiCCollisionDetection> {
        let index = self.checked_index(index, self.detections.len())?;
        Some(self.detections[index].as_ref())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetCollisionDetectionAtMut(&mut self, index: i32) -> Option<&mut dyn OpiCCollisionDetection> {
        let index = self.checked_index(index, self.detections.len())?;
        Some(self.detections[index].as_mut())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetPerturbationModuleCount(&self) -> i32 {
        self.modules.len() as i32
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetPerturbationModule(&self, name: &str) -> Option<&dyn OpiCPerturbationModule> {
        self.modules.iter().find(|m| m.name() == name).map(|m| m.as_ref())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetPerturbationModuleAt(&self, index: i32) -> Option<&dyn OpiCPerturbationModule> {
        let index = self.checked_index(index, self.modules.len())?;
        Some(self.modules[index].as_ref())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetIntegratorCount(&self) -> i32 {
        self.integrators.len() as i32
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetIntegrator(&self, name: &str) -> Option<&dyn OpiCPropagatorIntegrator> {
        self.integrators.iter().find(|i| i.name() == name).map(|i| i.as_ref())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetIntegratorAt(&self, index: i32) -> Option<&dyn OpiCPropagatorIntegrator> {
        let index = self.checked_index(index, self.integrators.len())?;
        Some(self.integrators[index].as_ref())
    }

    // ----- GPU facade -----

    #[allow(non_snake_case)]
    pub fn OpiFHasGpuBackend(&self) -> bool {
        self.shared.with_gpu(|_| ()).is_some()
    }

    /// A backend is active and reports at least one device.
    #[allow(non_snake_case)]
    pub fn OpiFHasGpuSupport(&self) -> bool {
        self.shared.gpu_device_count() > 0
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetGpuPlatform(&self) -> OpiCGpuPlatform {
        self.shared.gpu_platform()
    }

    /// Runs \`f\` against the active backend, \`None\` without one.
    #[allow(non_snake_case)]
    pub fn OpiFUseGpuSupport<R>(&self, f: impl FnOnce(&dyn OpiCGpuSupport) -> R) -> Option<R> {
        self.shared.with_gpu(f)
    }

    #[allow(non_snake_case)]
    pub fn OpiFUseGpuSupportMut<R>(&self, f: impl FnOnce(&mut dyn OpiCGpuSupport) -> R) -> Option<R> {
        self.shared.with_gpu_mut(f)
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetGpuDeviceCount(&self) -> i32 {
        self.shared.gpu_device_count()
    }

    /// Selects `device` and returns it, or -1 without a backend. An index
    /// the backend does not have is reported as `InvalidDevice`.
    #[allow(non_snake_case)]
    pub fn OpiFSelectGpuDevice(&self, device: i32) -> i32 {
        if !self.OpiFHasGpuBackend() {
            return -1;
        }
        if !(0..self.shared.gpu_device_count()).contains(&device) {
            self.OpiFSendError(OpiCErrorCode::InvalidDevice);
            return -1;
        }
        self.shared
            .with_gpu_mut(|gpu| {
                gpu.select_device(device);
                device
            })
            .unwrap_or(-1)
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetCurrentGpuDevice(&self) -> i32 {
        self.shared.with_gpu(|gpu| gpu.current_device()).unwrap_or(-1)
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetCurrentGpuDeviceName(&self) -> String {
        self.shared
            .with_gpu(|gpu| gpu.current_device_name())
            .unwrap_or_else(|| OPI_NO_GPU_DEVICE_NAME.to_string())
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetCurrentGpuDeviceCapability(&self) -> i32 {
        self.shared.gpu_capability()
    }

    #[allow(non_snake_case)]
    pub fn OpiFGetGpuDeviceProperties(&self, device: i32) -> Option<OpiCDeviceProperties> {
        self.shared.with_gpu(|gpu| gpu.device_properties(device)).flatten()
    }
}

fn disable_all<T: OpiCModule + ?Sized>(objects: &mut Vec<Box<T>>, kind: &str) {
    for mut object in objects.drain(..) {
        let code = object.disable();
        if !code.OpiFIsSuccess() {
            log::warn!(
                "opi.host.disable_failed: object reported an error while disabling - kind={}, name={}, code={}",
                kind,
                object.name(),
                code
            );
        }
        log::debug!("opi.host.destroy: destroying object - kind={}, name={}", kind, object.name());
        drop(object);
    }
}

impl Drop for OpiCHost {
    fn drop(&mut self) {
        log::debug!("opi.host.teardown: shutting down host - host={}", self.shared.id);

        disable_all(&mut self.propagators, "propagator");
        disable_all(&mut self.queries, "distance query");
        disable_all(&mut self.detections, "collision detection");
        disable_all(&mut self.modules, "perturbation module");
        disable_all(&mut self.integrators, "integrator");

        let backend = match self.shared.gpu.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(backend) = backend {
            backend.OpiFShutdown();
        }

        for descriptor in self.plugins.drain(..) {
            log::debug!(
                "opi.host.unload: unloading plugin - name={}, path={}",
                descriptor.OpiFName(),
                descriptor.OpiFPath().display()
            );
            drop(descriptor);
        }
    }
}
