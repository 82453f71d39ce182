//! Component registrations and the selection of the constructor used for injection.
//!
//! There is no runtime reflection, so every component registers its constructors explicitly.
//! A [Component] may carry an injectable constructor, a no-arg constructor, a pre-built instance
//! and any number of interfaces it implements.

use std::{marker::PhantomData, sync::Arc};

use crate::{
    errors::InitError,
    factories::{
        erase_constructor, erase_try_constructor, Constructor, DynConstruct, TryConstructor,
    },
    resolver::Arguments,
    type_resolver::Implementation,
    types::{DependencyInfo, DynError, Injectable, Instance, TypeInfo},
};

/// Which constructor a recipe was registered as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeKind {
    /// The constructor designated for injection
    Injectable,
    /// The fallback constructor without arguments
    NoArg,
}

/// Everything needed to construct a concrete type
pub struct ConstructorRecipe {
    pub kind: RecipeKind,
    /// Parameter types, in order
    pub dependencies: Vec<DependencyInfo>,
    construct: DynConstruct,
}

impl ConstructorRecipe {
    pub(crate) fn construct(&self, args: Arguments) -> Result<Instance, DynError> {
        (self.construct)(args)
    }
}

impl std::fmt::Debug for ConstructorRecipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorRecipe")
            .field("kind", &self.kind)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Registration of a concrete component type
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use wrapp_beans::Component;
///
/// #[derive(Default)]
/// struct Repository;
/// struct Service {
///     repository: Arc<Repository>,
/// }
///
/// let repository = Component::<Repository>::new().default_constructor();
/// let service = Component::<Service>::new()
///     .injectable(|repository: Arc<Repository>| Service { repository });
/// ```
pub struct Component<T: Injectable> {
    descriptor: ComponentDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> Default for Component<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Injectable> Component<T> {
    /// A component without any constructor yet
    pub fn new() -> Self {
        Component {
            descriptor: ComponentDescriptor {
                info: TypeInfo::of::<T>(),
                injectable: None,
                no_arg: None,
                instance: None,
                implementations: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Registers the constructor used for injection
    ///
    /// Every parameter is an `Arc<Dependency>`, resolved before the constructor is called.
    pub fn injectable<Args, F>(mut self, constructor: F) -> Self
    where
        F: Constructor<Args, Output = T>,
    {
        self.descriptor.injectable = Some(ConstructorRecipe {
            kind: RecipeKind::Injectable,
            dependencies: F::dependencies(),
            construct: erase_constructor(constructor),
        });
        self
    }

    /// Registers a fallible constructor used for injection
    pub fn try_injectable<Args, F>(mut self, constructor: F) -> Self
    where
        F: TryConstructor<Args, Output = T>,
    {
        self.descriptor.injectable = Some(ConstructorRecipe {
            kind: RecipeKind::Injectable,
            dependencies: F::dependencies(),
            construct: erase_try_constructor(constructor),
        });
        self
    }

    /// Registers the no-arg constructor, used if no injectable constructor is registered
    pub fn no_arg<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.descriptor.no_arg = Some(ConstructorRecipe {
            kind: RecipeKind::NoArg,
            dependencies: Vec::new(),
            construct: erase_constructor(constructor),
        });
        self
    }

    /// Registers a fallible no-arg constructor
    pub fn try_no_arg<F, E>(mut self, constructor: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        self.descriptor.no_arg = Some(ConstructorRecipe {
            kind: RecipeKind::NoArg,
            dependencies: Vec::new(),
            construct: erase_try_constructor(constructor),
        });
        self
    }

    /// Uses [Default] as the no-arg constructor
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.no_arg(T::default)
    }

    /// Uses an already constructed instance as the bean
    pub fn instance(mut self, instance: T) -> Self {
        self.descriptor.instance = Some(Instance::new(instance));
        self
    }

    /// Declares that the component implements the interface `I`
    ///
    /// `upcast` converts the bean into the trait object, usually `|bean| bean`.
    pub fn implements<I: ?Sized + Injectable>(mut self, upcast: fn(Arc<T>) -> Arc<I>) -> Self {
        self.descriptor
            .implementations
            .push(Implementation::new(upcast));
        self
    }

    pub fn info(&self) -> TypeInfo {
        self.descriptor.info
    }
}

impl<T: Injectable> From<Component<T>> for ComponentDescriptor {
    fn from(component: Component<T>) -> Self {
        component.descriptor
    }
}

/// Type erased [Component]
pub struct ComponentDescriptor {
    pub(crate) info: TypeInfo,
    pub(crate) injectable: Option<ConstructorRecipe>,
    pub(crate) no_arg: Option<ConstructorRecipe>,
    pub(crate) instance: Option<Instance>,
    pub(crate) implementations: Vec<Implementation>,
}

impl ComponentDescriptor {
    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn implementations(&self) -> &[Implementation] {
        &self.implementations
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("info", &self.info)
            .field("injectable", &self.injectable)
            .field("no_arg", &self.no_arg)
            .field("instance", &self.instance.is_some())
            .finish()
    }
}

/// Selects the constructor used to build `info`
///
/// The injectable constructor is preferred, the no-arg constructor is the fallback.
pub fn find_injectable_constructor(
    descriptor: Option<&ComponentDescriptor>,
    info: TypeInfo,
) -> Result<&ConstructorRecipe, InitError> {
    descriptor
        .and_then(|descriptor| descriptor.injectable.as_ref().or(descriptor.no_arg.as_ref()))
        .ok_or(InitError::NoUsableConstructor(info))
}
