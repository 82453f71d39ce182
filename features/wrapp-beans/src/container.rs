use std::{any::TypeId, collections::HashMap, fmt::Debug, sync::Arc};

use crate::{
    dependency_graph::DependencyGraph,
    errors::RequireError,
    type_resolver::InterfaceTable,
    types::{Injectable, Instance, TypeInfo},
};

/// Container holding all initialized beans
///
/// The container is read-only, clones share the same beans and can be sent to other threads.
#[derive(Clone)]
pub struct BeanContainer(pub Arc<BeanContainerInner>);
pub struct BeanContainerInner {
    beans: HashMap<TypeId, Instance>,
    interfaces: InterfaceTable,
    graph: DependencyGraph,
}
impl Debug for BeanContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self
            .0
            .beans
            .values()
            .map(|instance| instance.info.type_name)
            .collect();
        names.sort_unstable();

        f.debug_struct("BeanContainer")
            .field("beans", &names)
            .finish()
    }
}

impl BeanContainer {
    pub(crate) fn new(
        beans: HashMap<TypeId, Instance>,
        interfaces: InterfaceTable,
        graph: DependencyGraph,
    ) -> Self {
        Self(Arc::new(BeanContainerInner {
            beans,
            interfaces,
            graph,
        }))
    }

    /// Returns the bean of type `T`, or None if there is none
    ///
    /// `T` may be an interface (`dyn Trait`) with exactly one declared implementation.
    pub fn get_bean<T: ?Sized + Injectable>(&self) -> Option<Arc<T>> {
        self.require::<T>().ok()
    }

    /// Attempts to get the requested type
    pub fn require<T: ?Sized + Injectable>(&self) -> Result<Arc<T>, RequireError> {
        let instance = self.get_instance(TypeInfo::of::<T>())?;

        instance
            .downcast::<T>()
            .ok_or(RequireError::DowncastFailed {
                required_type: std::any::type_name::<T>(),
                actual_type: instance.info.type_name,
            })
    }

    /// Type erased lookup
    pub fn get_instance(&self, info: TypeInfo) -> Result<Instance, RequireError> {
        if let Some(instance) = self.0.beans.get(&info.type_id) {
            return Ok(instance.clone());
        }

        if !info.is_interface() {
            return Err(RequireError::TypeMissing(info.type_name));
        }

        // Interfaces are never registered, answer with the single implementation
        match self.0.interfaces.candidates(info) {
            [implementation] => self
                .0
                .beans
                .get(&implementation.concrete.type_id)
                .and_then(|concrete| implementation.upcast(concrete))
                .ok_or(RequireError::TypeMissing(info.type_name)),
            candidates => Err(RequireError::InterfaceUnresolved {
                interface: info.type_name,
                candidates: candidates.len(),
            }),
        }
    }

    pub fn contains<T: ?Sized + Injectable>(&self) -> bool {
        self.get_instance(TypeInfo::of::<T>()).is_ok()
    }

    /// Number of constructed beans, interfaces are not counted
    pub fn len(&self) -> usize {
        self.0.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.beans.is_empty()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.0.graph
    }
}
