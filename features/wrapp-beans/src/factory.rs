use std::{
    any::TypeId,
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use crate::{
    builder::BeanFactoryBuilder,
    configuration::{ConfigurationProvider, ConfigurationRegistry},
    container::BeanContainer,
    dependency_graph::{BeanOrigin, DependencyGraph},
    errors::{InitError, RequireError},
    inspector::{find_injectable_constructor, ComponentDescriptor},
    resolver::Arguments,
    type_resolver::InterfaceTable,
    types::{DependencyInfo, Injectable, Instance, TypeInfo},
};

/// Lifecycle of a [BeanFactory]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryState {
    /// Declared types are fixed, no bean exists yet
    Created,
    /// Beans are being resolved
    Initializing,
    /// Every declared type has a bean, lookups are possible
    Ready,
}

/// Builds a singleton of every declared type, wiring their dependencies
///
/// The graph is built eagerly by [BeanFactory::initialize], afterwards it is frozen and beans can be
/// looked up with [BeanFactory::get_bean] or shared through [BeanFactory::container].
pub struct BeanFactory {
    /// Declared types, including the ones produced by configuration providers
    declared: Vec<TypeInfo>,
    components: HashMap<TypeId, ComponentDescriptor>,
    /// Components registered more than once
    duplicates: Vec<TypeInfo>,
    configurations: ConfigurationRegistry,
    interfaces: InterfaceTable,

    state: FactoryState,
    container: Option<BeanContainer>,
}

impl BeanFactory {
    pub fn builder() -> BeanFactoryBuilder {
        BeanFactoryBuilder::new()
    }

    /// Declares all components and merges in the types produced by the configuration providers
    pub fn new(
        components: Vec<ComponentDescriptor>,
        configurations: Vec<ConfigurationProvider>,
    ) -> Self {
        let configurations = ConfigurationRegistry::new(configurations);

        let mut declared = Vec::with_capacity(components.len());
        let mut duplicates = Vec::new();
        let mut registered = HashMap::with_capacity(components.len());
        for component in components {
            let info = component.info;
            match registered.entry(info.type_id) {
                Entry::Occupied(_) => duplicates.push(info),
                Entry::Vacant(entry) => {
                    declared.push(info);
                    entry.insert(component);
                }
            }
        }

        let configured = configurations.find_all_bean_types();
        let configured_count = configured.len();
        for info in configured {
            if !registered.contains_key(&info.type_id) {
                declared.push(info);
            }
        }

        let interfaces = InterfaceTable::new(
            registered
                .values()
                .flat_map(ComponentDescriptor::implementations)
                .chain(configurations.implementations()),
        );

        tracing::debug!(
            "Declared {} types - {} produced by {} configuration providers",
            declared.len(),
            configured_count,
            configurations.providers().len()
        );

        BeanFactory {
            declared,
            components: registered,
            duplicates,
            configurations,
            interfaces,
            state: FactoryState::Created,
            container: None,
        }
    }

    /// Constructs a bean for every declared type
    ///
    /// Fails on the first error, in which case the factory stays in [FactoryState::Created] without any beans.
    pub fn initialize(&mut self) -> Result<(), InitError> {
        self.initialize_container().map(|_| ())
    }

    pub(crate) fn initialize_container(&mut self) -> Result<BeanContainer, InitError> {
        if self.state == FactoryState::Ready {
            return Err(InitError::AlreadyInitialized);
        }

        self.state = FactoryState::Initializing;
        tracing::debug!(
            "Initializing bean factory with {} declared types",
            self.declared.len()
        );

        match self.try_initialize() {
            Ok(container) => {
                tracing::debug!("All {} beans constructed - bean factory ready", container.len());
                self.container = Some(container.clone());
                self.state = FactoryState::Ready;
                Ok(container)
            }
            Err(error) => {
                tracing::error!("Bean factory initialization failed: {error}");
                self.state = FactoryState::Created;
                Err(error)
            }
        }
    }

    fn try_initialize(&self) -> Result<BeanContainer, InitError> {
        if let Some(duplicate) = self.duplicates.first() {
            return Err(InitError::DuplicateComponent(*duplicate));
        }
        self.configurations.validate()?;

        let mut resolution = Resolution::new(&self.components, &self.configurations, &self.interfaces);
        resolution.seed_instances();

        for info in &self.declared {
            resolution.resolve(*info)?;
        }

        Ok(resolution.finish(self.interfaces.clone()))
    }

    pub fn state(&self) -> FactoryState {
        self.state
    }

    /// The declared types, in declaration order
    pub fn declared_types(&self) -> &[TypeInfo] {
        &self.declared
    }

    pub fn configurations(&self) -> &ConfigurationRegistry {
        &self.configurations
    }

    /// Returns the bean of type `T`
    ///
    /// Returns None if the factory is not initialized or the type is unknown.
    pub fn get_bean<T: ?Sized + Injectable>(&self) -> Option<Arc<T>> {
        self.container.as_ref()?.get_bean::<T>()
    }

    /// Attempts to get the requested type
    pub fn require<T: ?Sized + Injectable>(&self) -> Result<Arc<T>, RequireError> {
        self.container()?.require::<T>()
    }

    /// The finished container, which can be shared freely
    pub fn container(&self) -> Result<&BeanContainer, RequireError> {
        self.container.as_ref().ok_or(RequireError::NotReady)
    }
}

impl std::fmt::Debug for BeanFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanFactory")
            .field("state", &self.state)
            .field("declared", &self.declared)
            .finish()
    }
}

/// State of one initialization run
///
/// Beans are resolved depth first, each type is constructed at most once.
struct Resolution<'a> {
    components: &'a HashMap<TypeId, ComponentDescriptor>,
    configurations: &'a ConfigurationRegistry,
    interfaces: &'a InterfaceTable,

    beans: HashMap<TypeId, Instance>,
    graph: DependencyGraph,
    /// Types currently being resolved, outermost first
    chain: Vec<TypeInfo>,
}

impl<'a> Resolution<'a> {
    fn new(
        components: &'a HashMap<TypeId, ComponentDescriptor>,
        configurations: &'a ConfigurationRegistry,
        interfaces: &'a InterfaceTable,
    ) -> Self {
        Resolution {
            components,
            configurations,
            interfaces,
            beans: HashMap::new(),
            graph: DependencyGraph::default(),
            chain: Vec::new(),
        }
    }

    /// Registers all pre built instances
    fn seed_instances(&mut self) {
        let components = self.components;
        for component in components.values() {
            if let Some(instance) = &component.instance {
                tracing::debug!("Registered instance of {}", component.info);
                self.register(component.info, BeanOrigin::Instance, &[], instance.clone());
            }
        }
    }

    fn resolve(&mut self, info: TypeInfo) -> Result<Instance, InitError> {
        if let Some(instance) = self.beans.get(&info.type_id) {
            return Ok(instance.clone());
        }

        if let Some(start) = self.chain.iter().position(|entry| *entry == info) {
            let mut chain = self.chain[start..].to_vec();
            let to = chain.last().copied().unwrap_or(info);
            chain.push(info);
            return Err(InitError::CyclicDependency {
                from: info,
                to,
                chain,
            });
        }

        self.chain.push(info);
        let result = self.resolve_uncached(info);
        self.chain.pop();

        result
    }

    fn resolve_uncached(&mut self, info: TypeInfo) -> Result<Instance, InitError> {
        let configurations = self.configurations;
        let interfaces = self.interfaces;
        let components = self.components;

        // Configuration providers take precedence over constructors
        if let Some((provider, method)) = configurations.find_provider_for(info)? {
            tracing::trace!("Resolving {info} through configuration {}", provider.info);
            let args = self.resolve_dependencies(&method.dependencies)?;
            let instance = configurations.invoke(provider, method, args)?;

            return Ok(self.register(
                info,
                BeanOrigin::Configuration(provider.info),
                &method.dependencies,
                instance,
            ));
        }

        // Interfaces are resolved to their single implementation, but never registered themselves
        if info.is_interface() {
            let implementation = interfaces.resolve_concrete(info)?;
            tracing::trace!("Resolving {info} as {}", implementation.concrete);
            let concrete = self.resolve(implementation.concrete)?;

            return implementation.upcast(&concrete).ok_or_else(|| {
                InitError::invocation(
                    info,
                    format!("'{}' can not be viewed as '{info}'", concrete.info),
                )
            });
        }

        let recipe = find_injectable_constructor(components.get(&info.type_id), info)?;
        tracing::trace!("Resolving {info} through its {:?} constructor", recipe.kind);
        let args = self.resolve_dependencies(&recipe.dependencies)?;
        let instance = recipe
            .construct(Arguments::new(args))
            .map_err(|error| InitError::invocation(info, error))?;

        Ok(self.register(
            info,
            BeanOrigin::Constructor(recipe.kind),
            &recipe.dependencies,
            instance,
        ))
    }

    fn resolve_dependencies(
        &mut self,
        dependencies: &[DependencyInfo],
    ) -> Result<Vec<Instance>, InitError> {
        dependencies
            .iter()
            .map(|dependency| self.resolve(dependency.type_info))
            .collect()
    }

    /// Adds the bean to the registry, an existing bean is never replaced
    fn register(
        &mut self,
        info: TypeInfo,
        origin: BeanOrigin,
        dependencies: &[DependencyInfo],
        instance: Instance,
    ) -> Instance {
        match self.beans.entry(info.type_id) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(entry) => {
                tracing::debug!("Constructed instance of {}", info);
                self.graph.add(
                    info,
                    origin,
                    dependencies.iter().map(|dependency| dependency.type_info).collect(),
                );
                entry.insert(instance).clone()
            }
        }
    }

    fn finish(self, interfaces: InterfaceTable) -> BeanContainer {
        BeanContainer::new(self.beans, interfaces, self.graph)
    }
}
