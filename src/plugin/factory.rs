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

//! # Plugin Factory
//!
//! Turns an accepted descriptor into a live object. Dispatch is on the
//! declared category and then on the construction style:
//!
//! - **Native factory**: the plugin exports `OPI_Plugin_create<Kind>`,
//!   which takes a pointer to the host link and returns a heap-allocated
//!   `Box<dyn Trait>` (a thin pointer to the fat box). The host takes
//!   ownership of the box.
//! - **Function table**: the plugin exports `OPI_Plugin_get<Kind>Table`
//!   and the host wraps the table in an adapter from `crate::plugin::table`.
//!
//! Categories the host does not instantiate produce `Ok(None)`.

use std::fmt;

use crate::errors::{OpiError, Result};
use crate::host::OpiCHostRef;
use crate::module::base::{OpiCModule, OpiCModuleState};
use crate::module::detection::OpiCCollisionDetection;
use crate::module::propagator::OpiCPropagator;
use crate::module::query::OpiCDistanceQuery;
use crate::plugin::category::OpiCPluginCategory;
use crate::plugin::descriptor::OpiCPluginDescriptor;
use crate::plugin::table::{
    OpiCTableCollisionDetection, OpiCTableDistanceQuery, OpiCTablePropagator, OpiFGetCollisionDetectionTable,
    OpiFGetDistanceQueryTable, OpiFGetPropagatorTable,
};

/// Signature shared by the native `OPI_Plugin_create*` constructors.
pub type OpiFCreateNative<T> = unsafe extern "C" fn(host: *const OpiCHostRef) -> *mut Box<T>;

/// An object produced by the factory, tagged with its registry.
pub enum OpiCLoadedObject {
    Propagator(Box<dyn OpiCPropagator>),
    DistanceQuery(Box<dyn OpiCDistanceQuery>),
    CollisionDetection(Box<dyn OpiCCollisionDetection>),
}

impl OpiCLoadedObject {
    #[allow(non_snake_case)]
    pub fn OpiFName(&self) -> &str {
        match self {
            OpiCLoadedObject::Propagator(object) => object.name(),
            OpiCLoadedObject::DistanceQuery(object) => object.name(),
            OpiCLoadedObject::CollisionDetection(object) => object.name(),
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFCategory(&self) -> OpiCPluginCategory {
        match self {
            OpiCLoadedObject::Propagator(_) => OpiCPluginCategory::Propagator,
            OpiCLoadedObject::DistanceQuery(_) => OpiCPluginCategory::DistanceQuery,
            OpiCLoadedObject::CollisionDetection(_) => OpiCPluginCategory::CollisionDetection,
        }
    }
}

impl fmt::Debug for OpiCLoadedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpiCLoadedObject")
            .field("category", &self.OpiFCategory())
            .field("name", &self.OpiFName())
            .finish()
    }
}

/// Instantiates the object behind `descriptor`.
///
/// The descriptor must be valid. The object is returned disabled and
/// without a host link; registering it is the caller's job.
#[allow(non_snake_case)]
pub fn OpiFInstantiate(descriptor: &OpiCPluginDescriptor, host: &OpiCHostRef) -> Result<Option<OpiCLoadedObject>> {
    if !descriptor.OpiFIsValid() {
        return Err(OpiError::internal(format!(
            "cannot instantiate unreadable plugin '{}'",
            descriptor.OpiFPath().display()
        )));
    }

    let category = descriptor.OpiFCategory();
    let native = descriptor.OpiFInfo().native_factory;
    log::debug!(
        "opi.factory.instantiate: creating plugin object - plugin={}, category={}, native={}",
        descriptor.OpiFName(),
        category,
        native
    );

    let object = match category {
        OpiCPluginCategory::Propagator if native => {
            OpiCLoadedObject::Propagator(create_native::<dyn OpiCPropagator>(descriptor, category, host)?)
        }
        OpiCPluginCategory::Propagator => OpiCLoadedObject::Propagator(Box::new(table_propagator(descriptor)?)),
        OpiCPluginCategory::DistanceQuery if native => {
            OpiCLoadedObject::DistanceQuery(create_native::<dyn OpiCDistanceQuery>(descriptor, category, host)?)
        }
        OpiCPluginCategory::DistanceQuery => {
            OpiCLoadedObject::DistanceQuery(Box::new(table_distance_query(descriptor)?))
        }
        OpiCPluginCategory::CollisionDetection if native => OpiCLoadedObject::CollisionDetection(
            create_native::<dyn OpiCCollisionDetection>(descriptor, category, host)?,
        ),
        OpiCPluginCategory::CollisionDetection => {
            OpiCLoadedObject::CollisionDetection(Box::new(table_collision_detection(descriptor)?))
        }
        other => {
            log::info!(
                "opi.factory.skipped: host does not instantiate this plugin type - plugin={}, type={}",
                descriptor.OpiFName(),
                other
            );
            return Ok(None);
        }
    };

    Ok(Some(object))
}

fn symbol_name(descriptor: &OpiCPluginDescriptor, name: Option<&'static str>) -> Result<&'static str> {
    name.ok_or_else(|| {
        OpiError::internal(format!(
            "no constructor symbol for {} '{}'",
            descriptor.OpiFCategory(),
            descriptor.OpiFName()
        ))
    })
}

fn create_native<T: ?Sized>(
    descriptor: &OpiCPluginDescriptor,
    category: OpiCPluginCategory,
    host: &OpiCHostRef,
) -> Result<Box<T>> {
    let name = symbol_name(descriptor, category.OpiFFactorySymbol())?;
    let symbol = descriptor.OpiFRequireSymbol(name)?;

    // SAFETY: native plugins export their constructor with the
    // `OpiFCreateNative` signature for their category and hand over
    // ownership of the returned box.
    unsafe {
        let create: OpiFCreateNative<T> = symbol.OpiFCast();
        let raw = create(host as *const OpiCHostRef);
        if raw.is_null() {
            return Err(OpiError::malformed(
                descriptor.OpiFPath().to_string_lossy(),
                format!("{} returned null", name),
            ));
        }
        Ok(*Box::from_raw(raw))
    }
}

fn table_state(descriptor: &OpiCPluginDescriptor) -> OpiCModuleState {
    let info = descriptor.OpiFInfo();
    OpiCModuleState::OpiFNew(info.name.clone())
        .OpiFWithAuthor(info.author.clone())
        .OpiFWithDescription(info.description.clone())
}

/// Resolves the table accessor and dereferences the table it returns.
///
/// # Safety
///
/// `F` must be the accessor type for the category's table `T`, and the
/// accessor must return null or a pointer to a static table.
unsafe fn resolve_table<F: Copy, T: Copy>(
    descriptor: &OpiCPluginDescriptor,
    accessor: impl FnOnce(F) -> *const T,
) -> Result<T> {
    let name = symbol_name(descriptor, descriptor.OpiFCategory().OpiFTableSymbol())?;
    let symbol = descriptor.OpiFRequireSymbol(name)?;
    let table = accessor(symbol.OpiFCast::<F>());
    if table.is_null() {
        return Err(OpiError::malformed(
            descriptor.OpiFPath().to_string_lossy(),
            format!("{} returned null", name),
        ));
    }
    Ok(*table)
}

fn table_propagator(descriptor: &OpiCPluginDescriptor) -> Result<OpiCTablePropagator> {
    // SAFETY: the descriptor keeps the library mapped until every object
    // created from it is gone.
    unsafe {
        let table = resolve_table(descriptor, |get: OpiFGetPropagatorTable| get())?;
        OpiCTablePropagator::OpiFNew(&table, table_state(descriptor), descriptor.OpiFPath())
    }
}

fn table_distance_query(descriptor: &OpiCPluginDescriptor) -> Result<OpiCTableDistanceQuery> {
    // SAFETY: as for propagators.
    unsafe {
        let table = resolve_table(descriptor, |get: OpiFGetDistanceQueryTable| get())?;
        OpiCTableDistanceQuery::OpiFNew(&table, table_state(descriptor), descriptor.OpiFPath())
    }
}

fn table_collision_detection(descriptor: &OpiCPluginDescriptor) -> Result<OpiCTableCollisionDetection> {
    // SAFETY: as for propagators.
    unsafe {
        let table = resolve_table(descriptor, |get: OpiFGetCollisionDetectionTable| get())?;
        OpiCTableCollisionDetection::OpiFNew(&table, table_state(descriptor), descriptor.OpiFPath())
    }
}
