use std::{any::TypeId, collections::HashMap, sync::Arc};

use crate::{
    errors::InitError,
    types::{Injectable, Instance, TypeInfo},
};

type Upcast = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// A declared "implements" relation between a concrete type and an interface
#[derive(Clone)]
pub struct Implementation {
    pub interface: TypeInfo,
    pub concrete: TypeInfo,
    upcast: Upcast,
}

impl Implementation {
    pub(crate) fn new<T: Injectable, I: ?Sized + Injectable>(upcast: fn(Arc<T>) -> Arc<I>) -> Self {
        Implementation {
            interface: TypeInfo::of::<I>(),
            concrete: TypeInfo::of::<T>(),
            upcast: Arc::new(move |instance: &Instance| {
                instance
                    .downcast::<T>()
                    .map(|concrete| Instance::from_arc(upcast(concrete)))
            }),
        }
    }

    /// Views the concrete bean as the interface
    ///
    /// Returns None if the instance is not of the concrete type.
    pub fn upcast(&self, concrete: &Instance) -> Option<Instance> {
        (self.upcast)(concrete)
    }
}

impl std::fmt::Debug for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Implementation")
            .field("interface", &self.interface)
            .field("concrete", &self.concrete)
            .finish()
    }
}

/// Lookup table from interface to its implementing concrete types
///
/// Built once from every declared type, there is no priority or qualifier mechanism:
/// an interface must have exactly one implementation to be resolvable.
#[derive(Debug, Default, Clone)]
pub struct InterfaceTable {
    implementations: HashMap<TypeId, Vec<Implementation>>,
}

impl InterfaceTable {
    pub fn new<'a>(universe: impl IntoIterator<Item = &'a Implementation>) -> Self {
        let mut table = Self::default();
        for implementation in universe {
            table.add(implementation.clone());
        }
        table
    }

    fn add(&mut self, implementation: Implementation) {
        let candidates = self
            .implementations
            .entry(implementation.interface.type_id)
            .or_default();

        // The same type may declare an interface more than once, it still is one candidate
        if candidates
            .iter()
            .all(|candidate| candidate.concrete != implementation.concrete)
        {
            candidates.push(implementation);
        }
    }

    /// All declared implementations of the interface
    pub fn candidates(&self, interface: TypeInfo) -> &[Implementation] {
        self.implementations
            .get(&interface.type_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Selects the single concrete type implementing `interface`
    pub fn resolve_concrete(&self, interface: TypeInfo) -> Result<&Implementation, InitError> {
        match self.candidates(interface) {
            [] => Err(InitError::UnresolvedInterface(interface)),
            [implementation] => Ok(implementation),
            candidates => Err(InitError::AmbiguousImplementation {
                interface,
                candidates: candidates.iter().map(|c| c.concrete).collect(),
            }),
        }
    }
}
