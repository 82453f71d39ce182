//! A synchronous object graph container.
//!
//! Every declared type is built exactly once when the factory is initialized, its dependencies are
//! resolved first and shared by every consumer. Types are built by
//! - a factory method of a registered [Configuration] producing the type
//! - the injectable constructor of its [Component]
//! - the no-arg constructor of its [Component]
//!
//! Interfaces are `dyn Trait` types, they resolve to the single declared type implementing them.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use wrapp_beans::{BeanFactory, Component};
//!
//! trait Repository: Send + Sync {
//!     fn find(&self, id: u32) -> String;
//! }
//!
//! #[derive(Default)]
//! struct MemoryRepository;
//! impl Repository for MemoryRepository {
//!     fn find(&self, id: u32) -> String {
//!         format!("user-{id}")
//!     }
//! }
//!
//! struct Service {
//!     repository: Arc<dyn Repository>,
//! }
//!
//! let mut factory = BeanFactory::builder()
//!     .add_component(
//!         Component::<Service>::new()
//!             .injectable(|repository: Arc<dyn Repository>| Service { repository }),
//!     )
//!     .add_component(
//!         Component::<MemoryRepository>::new()
//!             .default_constructor()
//!             .implements::<dyn Repository>(|bean| bean),
//!     )
//!     .build();
//!
//! factory.initialize().unwrap();
//!
//! let service = factory.get_bean::<Service>().unwrap();
//! assert_eq!(service.repository.find(7), "user-7");
//! ```

mod builder;
mod configuration;
mod container;
mod dependency_graph;
mod errors;
mod factories;
mod factory;
mod inspector;
mod resolver;
mod type_resolver;
mod types;

pub use builder::BeanFactoryBuilder;
pub use configuration::{
    BeanMethodRegistration, BeanMethods, Configuration, ConfigurationProvider,
    ConfigurationRegistry, FactoryMethod,
};
pub use container::BeanContainer;
pub use dependency_graph::{BeanOrigin, DependencyGraph};
pub use errors::{ArgumentError, InitError, RequireError};
pub use factories::{BeanMethod, Constructor, TryBeanMethod, TryConstructor};
pub use factory::{BeanFactory, FactoryState};
pub use inspector::{
    find_injectable_constructor, Component, ComponentDescriptor, ConstructorRecipe, RecipeKind,
};
pub use resolver::{Arguments, Resolver};
pub use type_resolver::{Implementation, InterfaceTable};
pub use types::{DependencyInfo, DynError, Injectable, Instance, TypeInfo, TypeKind};
