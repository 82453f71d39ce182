//! Configuration providers: factories for beans which can not be built by a plain constructor.
//!
//! A provider is a [Configuration] type registering its factory methods through [BeanMethods].
//! To build a bean, the provider itself is created with [Default], then the single method
//! producing the bean is called with its resolved dependencies.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use wrapp_beans::{BeanMethods, Configuration};
//!
//! struct DataSource {
//!     url: String,
//! }
//! struct JdbcTemplate {
//!     data_source: Arc<DataSource>,
//! }
//!
//! #[derive(Default)]
//! struct DataSourceConfig;
//! impl DataSourceConfig {
//!     fn data_source(&self) -> DataSource {
//!         DataSource { url: "jdbc:h2:mem:test".to_string() }
//!     }
//! }
//!
//! impl Configuration for DataSourceConfig {
//!     fn beans(methods: &mut BeanMethods<Self>) {
//!         methods.bean(Self::data_source);
//!         methods.bean(|_: &Self, data_source: Arc<DataSource>| JdbcTemplate { data_source });
//!     }
//! }
//! ```

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    marker::PhantomData,
    sync::Arc,
};

use crate::{
    errors::InitError,
    factories::{erase_bean_method, erase_try_bean_method, BeanMethod, DynInvoke, TryBeanMethod},
    resolver::Arguments,
    type_resolver::Implementation,
    types::{DependencyInfo, Injectable, Instance, TypeInfo},
};

/// A configuration provider
pub trait Configuration: Default + Injectable {
    /// Registers all factory methods of the provider
    fn beans(methods: &mut BeanMethods<Self>);
}

/// Collects the factory methods of the configuration provider `C`
pub struct BeanMethods<C> {
    methods: Vec<FactoryMethod>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Configuration> BeanMethods<C> {
    fn new() -> Self {
        BeanMethods {
            methods: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Registers a factory method, taking the provider and `Arc<Dependency>` parameters
    pub fn bean<Args, F>(&mut self, method: F) -> BeanMethodRegistration<'_, F::Output>
    where
        F: BeanMethod<C, Args>,
    {
        self.push(FactoryMethod {
            produces: TypeInfo::of::<F::Output>(),
            dependencies: F::dependencies(),
            invoke: erase_bean_method(method),
            implementations: Vec::new(),
        })
    }

    /// Registers a fallible factory method
    pub fn try_bean<Args, F>(&mut self, method: F) -> BeanMethodRegistration<'_, F::Output>
    where
        F: TryBeanMethod<C, Args>,
    {
        self.push(FactoryMethod {
            produces: TypeInfo::of::<F::Output>(),
            dependencies: F::dependencies(),
            invoke: erase_try_bean_method(method),
            implementations: Vec::new(),
        })
    }

    fn push<T: Injectable>(&mut self, method: FactoryMethod) -> BeanMethodRegistration<'_, T> {
        self.methods.push(method);
        let index = self.methods.len() - 1;
        BeanMethodRegistration {
            method: &mut self.methods[index],
            _marker: PhantomData,
        }
    }
}

/// A registered factory method, producing a `T`
pub struct BeanMethodRegistration<'a, T> {
    method: &'a mut FactoryMethod,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> BeanMethodRegistration<'_, T> {
    /// Declares that the produced bean implements the interface `I`
    pub fn implements<I: ?Sized + Injectable>(self, upcast: fn(Arc<T>) -> Arc<I>) -> Self {
        self.method
            .implementations
            .push(Implementation::new(upcast));
        self
    }
}

/// A factory method of a configuration provider
pub struct FactoryMethod {
    /// The type the method returns
    pub produces: TypeInfo,
    /// Parameter types, in order
    pub dependencies: Vec<DependencyInfo>,
    pub(crate) implementations: Vec<Implementation>,
    invoke: DynInvoke,
}

impl FactoryMethod {
    pub fn implementations(&self) -> &[Implementation] {
        &self.implementations
    }
}

impl std::fmt::Debug for FactoryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryMethod")
            .field("produces", &self.produces)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Type erased [Configuration]
pub struct ConfigurationProvider {
    pub info: TypeInfo,
    /// The provider's own no-arg construction
    create: fn() -> Box<dyn Any + Send + Sync>,
    methods: Vec<FactoryMethod>,
}

impl ConfigurationProvider {
    pub fn of<C: Configuration>() -> Self {
        let mut methods = BeanMethods::<C>::new();
        C::beans(&mut methods);

        ConfigurationProvider {
            info: TypeInfo::of::<C>(),
            create: || Box::new(C::default()),
            methods: methods.methods,
        }
    }

    pub fn methods(&self) -> &[FactoryMethod] {
        &self.methods
    }
}

impl std::fmt::Debug for ConfigurationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationProvider")
            .field("info", &self.info)
            .field("methods", &self.methods)
            .finish()
    }
}

/// All registered configuration providers, indexed by the types their methods produce
#[derive(Debug, Default)]
pub struct ConfigurationRegistry {
    providers: Vec<ConfigurationProvider>,
    /// Produced type -> (provider, method) indices
    products: HashMap<TypeId, Vec<(usize, usize)>>,
    /// Produced types in registration order
    bean_types: Vec<TypeInfo>,
}

impl ConfigurationRegistry {
    pub fn new(providers: Vec<ConfigurationProvider>) -> Self {
        let mut products: HashMap<TypeId, Vec<(usize, usize)>> = HashMap::new();
        let mut bean_types = Vec::new();

        for (provider_index, provider) in providers.iter().enumerate() {
            for (method_index, method) in provider.methods.iter().enumerate() {
                let producers = products.entry(method.produces.type_id).or_default();
                if producers.is_empty() {
                    bean_types.push(method.produces);
                }
                producers.push((provider_index, method_index));
            }
        }

        ConfigurationRegistry {
            providers,
            products,
            bean_types,
        }
    }

    /// Union of the types produced by all factory methods
    pub fn find_all_bean_types(&self) -> Vec<TypeInfo> {
        self.bean_types.clone()
    }

    pub fn has_bean(&self, info: TypeInfo) -> bool {
        self.products.contains_key(&info.type_id)
    }

    /// Finds the single factory method producing `info`
    ///
    /// Returns None if no provider produces the type.
    pub fn find_provider_for(
        &self,
        info: TypeInfo,
    ) -> Result<Option<(&ConfigurationProvider, &FactoryMethod)>, InitError> {
        let Some(producers) = self.products.get(&info.type_id) else {
            return Ok(None);
        };

        match producers.as_slice() {
            [] => Ok(None),
            [(provider, method)] => {
                let provider = &self.providers[*provider];
                Ok(Some((provider, &provider.methods[*method])))
            }
            producers => Err(InitError::AmbiguousProvider {
                product: info,
                providers: producers
                    .iter()
                    .map(|(provider, _)| self.providers[*provider].info)
                    .collect(),
            }),
        }
    }

    /// Checks that no type is produced by more than one factory method
    pub fn validate(&self) -> Result<(), InitError> {
        for product in &self.bean_types {
            self.find_provider_for(*product)?;
        }
        Ok(())
    }

    /// Creates the provider and calls the factory method with the resolved dependencies
    pub fn invoke(
        &self,
        provider: &ConfigurationProvider,
        method: &FactoryMethod,
        args: Vec<Instance>,
    ) -> Result<Instance, InitError> {
        let instance = (provider.create)();

        (method.invoke)(&*instance, Arguments::new(args))
            .map_err(|error| InitError::invocation(method.produces, error))
    }

    /// All interface relations declared on factory methods
    pub fn implementations(&self) -> impl Iterator<Item = &Implementation> {
        self.providers
            .iter()
            .flat_map(|provider| &provider.methods)
            .flat_map(|method| &method.implementations)
    }

    pub fn providers(&self) -> &[ConfigurationProvider] {
        &self.providers
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct DataSource {
        url: String,
    }
    struct Pool {
        data_source: Arc<DataSource>,
    }

    #[derive(Default)]
    struct DataSourceConfig;
    impl DataSourceConfig {
        fn data_source(&self) -> DataSource {
            DataSource {
                url: "jdbc:h2:mem:test".to_string(),
            }
        }
    }
    impl Configuration for DataSourceConfig {
        fn beans(methods: &mut BeanMethods<Self>) {
            methods.bean(Self::data_source);
            methods.bean(|_: &Self, data_source: Arc<DataSource>| Pool { data_source });
        }
    }

    #[derive(Default)]
    struct OtherDataSourceConfig;
    impl Configuration for OtherDataSourceConfig {
        fn beans(methods: &mut BeanMethods<Self>) {
            methods.bean(|_: &Self| DataSource {
                url: "other".to_string(),
            });
        }
    }

    #[test]
    fn indexes_methods_by_produced_type() {
        let registry = ConfigurationRegistry::new(vec![ConfigurationProvider::of::<DataSourceConfig>()]);

        assert_eq!(
            registry.find_all_bean_types(),
            vec![TypeInfo::of::<DataSource>(), TypeInfo::of::<Pool>()]
        );
        assert!(registry.has_bean(TypeInfo::of::<Pool>()));
        assert!(!registry.has_bean(TypeInfo::of::<String>()));

        let (provider, method) = registry
            .find_provider_for(TypeInfo::of::<Pool>())
            .unwrap()
            .unwrap();
        assert_eq!(provider.info, TypeInfo::of::<DataSourceConfig>());
        assert_eq!(method.dependencies, vec![DependencyInfo::of::<DataSource>()]);

        assert!(registry
            .find_provider_for(TypeInfo::of::<String>())
            .unwrap()
            .is_none());
    }

    #[test]
    fn invoke_calls_the_method_with_arguments() {
        let registry = ConfigurationRegistry::new(vec![ConfigurationProvider::of::<DataSourceConfig>()]);

        let (provider, method) = registry
            .find_provider_for(TypeInfo::of::<DataSource>())
            .unwrap()
            .unwrap();
        let data_source = registry.invoke(provider, method, vec![]).unwrap();

        let (provider, method) = registry
            .find_provider_for(TypeInfo::of::<Pool>())
            .unwrap()
            .unwrap();
        let pool = registry
            .invoke(provider, method, vec![data_source.clone()])
            .unwrap()
            .downcast::<Pool>()
            .unwrap();

        assert_eq!(pool.data_source.url, "jdbc:h2:mem:test");
        assert_eq!(Arc::as_ptr(&pool.data_source) as usize, data_source.addr());
    }

    #[test]
    fn two_providers_for_one_type_are_ambiguous() {
        let registry = ConfigurationRegistry::new(vec![
            ConfigurationProvider::of::<DataSourceConfig>(),
            ConfigurationProvider::of::<OtherDataSourceConfig>(),
        ]);

        assert!(matches!(
            registry.find_provider_for(TypeInfo::of::<DataSource>()),
            Err(InitError::AmbiguousProvider { ref providers, .. }) if providers.len() == 2
        ));
        assert!(registry.validate().is_err());
        assert_eq!(registry.find_all_bean_types().len(), 2);
    }

    static CREATED: AtomicUsize = AtomicUsize::new(0);

    struct CountingConfig;
    impl Default for CountingConfig {
        fn default() -> Self {
            CREATED.fetch_add(1, Ordering::SeqCst);
            CountingConfig
        }
    }
    impl Configuration for CountingConfig {
        fn beans(methods: &mut BeanMethods<Self>) {
            methods.try_bean(|_: &Self| "unreachable".parse::<u16>());
        }
    }

    #[test]
    fn failing_method_is_an_invocation_error() {
        let registry = ConfigurationRegistry::new(vec![ConfigurationProvider::of::<CountingConfig>()]);
        let (provider, method) = registry
            .find_provider_for(TypeInfo::of::<u16>())
            .unwrap()
            .unwrap();

        let before = CREATED.load(Ordering::SeqCst);
        let err = registry.invoke(provider, method, vec![]).unwrap_err();

        assert!(matches!(err, InitError::Invocation { product, .. } if product == TypeInfo::of::<u16>()));
        assert_eq!(CREATED.load(Ordering::SeqCst), before + 1);
    }
}
