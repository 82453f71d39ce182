use crate::{
    configuration::{Configuration, ConfigurationProvider},
    container::BeanContainer,
    errors::InitError,
    factory::BeanFactory,
    inspector::{Component, ComponentDescriptor},
    types::Injectable,
};

//////////////////////////////////////////////////////////////////////
///
/// The bean graph is set up in three steps
/// 1. The BeanFactoryBuilder where one declares all components, instances and configurations
/// 2. Initialization, which constructs every declared type
/// 3. The finished BeanContainer, used for lookups

pub struct BeanFactoryBuilder {
    /// Declared components
    pub(crate) components: Vec<ComponentDescriptor>,
    /// Registered configuration providers
    pub(crate) configurations: Vec<ConfigurationProvider>,
}
impl Default for BeanFactoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BeanFactoryBuilder {
    pub fn new() -> Self {
        BeanFactoryBuilder {
            components: Vec::new(),
            configurations: Vec::new(),
        }
    }
}
impl BeanFactoryBuilder {
    pub fn add_component<T: Injectable>(mut self, component: Component<T>) -> Self {
        self.components.push(component.into());
        self
    }

    /// Declares an already constructed bean
    pub fn add_instance<T: Injectable>(self, instance: T) -> Self {
        self.add_component(Component::new().instance(instance))
    }

    pub fn add_configuration<C: Configuration>(mut self) -> Self {
        self.configurations.push(ConfigurationProvider::of::<C>());
        self
    }

    /// Creates the factory, beans are not constructed until [BeanFactory::initialize]
    pub fn build(self) -> BeanFactory {
        BeanFactory::new(self.components, self.configurations)
    }

    /// Creates and initializes the factory, returning the finished container
    pub fn initialize(self) -> Result<BeanContainer, InitError> {
        self.build().initialize_container()
    }
}
