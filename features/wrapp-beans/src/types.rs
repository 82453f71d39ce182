use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// All errors must be Send + Sync, they are shared through `Arc` once wrapped in an [InitError](crate::errors::InitError)
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// The finished graph may be shared across threads
/// So anything injectable needs to be Send + Sync + 'static
///
/// Also implemented for unsized types, so `dyn Trait` interfaces can be injected.
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// A constructed bean
///
/// The erased value is always an `Arc<T>`, so every consumer of the bean shares the same allocation.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    instance: Arc<dyn Any + Send + Sync + 'static>,
    addr: usize,
}

impl Instance {
    pub(crate) fn new<ExistingInstance: Injectable>(instance: ExistingInstance) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    pub(crate) fn from_arc<T: ?Sized + Injectable>(instance: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            addr: Arc::as_ptr(&instance) as *const () as usize,
            instance: Arc::new(instance),
        }
    }

    /// Returns the shared bean if it is of type `T`
    pub fn downcast<T: ?Sized + Injectable>(&self) -> Option<Arc<T>> {
        self.instance.downcast_ref::<Arc<T>>().cloned()
    }

    /// Address of the shared allocation
    ///
    /// An interface view of a bean has the same address as the bean itself.
    pub fn addr(&self) -> usize {
        self.addr
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Information about a dependency of a constructor or factory method
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct DependencyInfo {
    /// The required Type
    pub type_info: TypeInfo,
}

impl DependencyInfo {
    pub fn of<T: ?Sized + Injectable>() -> Self {
        DependencyInfo {
            type_info: TypeInfo::of::<T>(),
        }
    }
}

/// If a type can be constructed directly, or has to be resolved to an implementation
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeKind {
    Concrete,
    /// An unsized type, e.g. `dyn Repository`
    Interface,
}

/// Type Name, Type Id and Kind
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub kind: TypeKind,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        // References to unsized types carry metadata (vtable or length)
        let kind = if std::mem::size_of::<&T>() == std::mem::size_of::<&()>() {
            TypeKind::Concrete
        } else {
            TypeKind::Interface
        };

        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            kind,
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }
    struct English;
    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn trait_objects_are_interfaces() {
        assert_eq!(TypeInfo::of::<English>().kind, TypeKind::Concrete);
        assert_eq!(TypeInfo::of::<dyn Greeter>().kind, TypeKind::Interface);
        assert!(TypeInfo::of::<dyn Greeter>().is_interface());
        assert_ne!(TypeInfo::of::<English>(), TypeInfo::of::<dyn Greeter>());
    }

    #[test]
    fn downcast_shares_the_allocation() {
        let instance = Instance::new(English);
        let first = instance.downcast::<English>().unwrap();
        let second = instance.clone().downcast::<English>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(instance.addr(), Arc::as_ptr(&first) as usize);
        assert!(instance.downcast::<String>().is_none());
    }

    #[test]
    fn trait_object_instances_downcast_to_the_interface() {
        let greeter: Arc<dyn Greeter> = Arc::new(English);
        let instance = Instance::from_arc(greeter);

        assert_eq!(instance.info, TypeInfo::of::<dyn Greeter>());
        assert_eq!(instance.downcast::<dyn Greeter>().unwrap().greet(), "hello");
    }
}
