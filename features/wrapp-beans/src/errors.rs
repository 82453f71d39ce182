use std::sync::Arc;

use thiserror::Error;

use crate::types::{DynError, TypeInfo};

/// Errors while initializing the bean graph
///
/// All of them are fatal, [BeanFactory::initialize](crate::factory::BeanFactory::initialize) aborts on the first one.
#[derive(Error, Debug, Clone)]
pub enum InitError {
    /// Neither an injectable nor a no-arg constructor is registered for the type
    #[error("No usable constructor for '{0}' - register an injectable or a no-arg constructor")]
    NoUsableConstructor(TypeInfo),

    /// More than one configuration factory method produces the same type
    #[error("'{product}' is produced by more than one configuration method: {providers:?}")]
    AmbiguousProvider {
        product: TypeInfo,
        providers: Vec<TypeInfo>,
    },

    /// No declared type implements the interface
    #[error("No declared type implements '{0}'")]
    UnresolvedInterface(TypeInfo),

    /// More than one declared type implements the interface
    #[error("'{interface}' is implemented by more than one declared type: {candidates:?}")]
    AmbiguousImplementation {
        interface: TypeInfo,
        candidates: Vec<TypeInfo>,
    },

    /// A constructor or factory method failed
    #[error("Constructing '{product}' failed - error: {error}")]
    Invocation {
        product: TypeInfo,
        error: Arc<DynError>,
    },

    /// A type depends on itself through the chain
    #[error("A Circular Dependency exists between '{from}' and '{to}' through {chain:?}")]
    CyclicDependency {
        from: TypeInfo,
        to: TypeInfo,
        chain: Vec<TypeInfo>,
    },

    /// A component has been registered twice
    #[error("A Type has been registered twice: '{0}'")]
    DuplicateComponent(TypeInfo),

    /// The factory is already initialized
    #[error("The bean factory has already been initialized")]
    AlreadyInitialized,
}

impl InitError {
    pub(crate) fn invocation(product: TypeInfo, error: impl Into<DynError>) -> Self {
        InitError::Invocation {
            product,
            error: Arc::new(error.into()),
        }
    }
}

/// Errors when trying to get a bean from the finished graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequireError {
    /// Beans can only be required once the factory is initialized
    #[error("The bean factory is not initialized, did you try using it before Initialization?")]
    NotReady,
    /// The required type is not known
    #[error("The required type is not known: '{0}'")]
    TypeMissing(&'static str),
    /// The required interface has no single implementation
    #[error("The required interface has {candidates} implementations: '{interface}'")]
    InterfaceUnresolved {
        interface: &'static str,
        candidates: usize,
    },

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Dependency arguments could not be converted into the constructor's parameter types
#[derive(Error, Debug, Clone)]
#[error("Argument {position} of type '{required_type}' was not provided")]
pub struct ArgumentError {
    pub position: usize,
    pub required_type: &'static str,
}
