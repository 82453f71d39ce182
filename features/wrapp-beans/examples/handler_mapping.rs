//! Maps request paths to handler beans of a finished container.
//!
//! Run with:
//!
//! ```no_rust
//! RUST_LOG=debug cargo run -p wrapp-beans --example handler_mapping
//! ```

use std::{collections::HashMap, error::Error, sync::Arc};

use tracing_subscriber::{prelude::*, EnvFilter};
use wrapp_beans::{BeanContainer, BeanFactory, BeanMethods, Component, Configuration};

struct DataSource {
    url: String,
}

#[derive(Default)]
struct DataSourceConfig;
impl DataSourceConfig {
    fn data_source(&self) -> DataSource {
        DataSource {
            url: "jdbc:h2:mem:users".to_string(),
        }
    }
}
impl Configuration for DataSourceConfig {
    fn beans(methods: &mut BeanMethods<Self>) {
        methods.bean(Self::data_source);
    }
}

trait UserRepository: Send + Sync {
    fn find_name(&self, id: u32) -> Option<String>;
}

struct SqlUserRepository {
    data_source: Arc<DataSource>,
}
impl UserRepository for SqlUserRepository {
    fn find_name(&self, id: u32) -> Option<String> {
        (id < 100).then(|| format!("user-{id}@{}", self.data_source.url))
    }
}

struct UserService {
    repository: Arc<dyn UserRepository>,
}

trait Handler: Send + Sync {
    fn handle(&self, query: &str) -> (u16, String);
}

struct UserController {
    service: Arc<UserService>,
}
impl Handler for UserController {
    fn handle(&self, query: &str) -> (u16, String) {
        match query.parse::<u32>().ok().and_then(|id| self.service.repository.find_name(id)) {
            Some(name) => (200, name),
            None => (404, format!("no user '{query}'")),
        }
    }
}

#[derive(Default)]
struct HealthController;
impl Handler for HealthController {
    fn handle(&self, _query: &str) -> (u16, String) {
        (200, "up".to_string())
    }
}

/// The consumer of the finished graph, only looks beans up
struct HandlerMapping {
    routes: HashMap<&'static str, Arc<dyn Handler>>,
}

impl HandlerMapping {
    fn new(container: &BeanContainer) -> Result<Self, Box<dyn Error>> {
        let users: Arc<dyn Handler> = container.require::<UserController>()?;
        let health: Arc<dyn Handler> = container.require::<HealthController>()?;

        Ok(HandlerMapping {
            routes: HashMap::from([("/users", users), ("/health", health)]),
        })
    }

    fn dispatch(&self, path: &str, query: &str) -> (u16, String) {
        match self.routes.get(path) {
            Some(handler) => handler.handle(query),
            None => (404, format!("no handler for '{path}'")),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let mut factory = BeanFactory::builder()
        .add_configuration::<DataSourceConfig>()
        .add_component(
            Component::<SqlUserRepository>::new()
                .injectable(|data_source: Arc<DataSource>| SqlUserRepository { data_source })
                .implements::<dyn UserRepository>(|bean| bean),
        )
        .add_component(
            Component::<UserService>::new()
                .injectable(|repository: Arc<dyn UserRepository>| UserService { repository }),
        )
        .add_component(
            Component::<UserController>::new()
                .injectable(|service: Arc<UserService>| UserController { service }),
        )
        .add_component(Component::<HealthController>::new().default_constructor())
        .build();

    factory.initialize()?;
    let container = factory.container()?;
    println!("{}", container.graph());

    let mapping = HandlerMapping::new(container)?;
    for (path, query) in [("/users", "7"), ("/users", "700"), ("/health", ""), ("/orders", "1")] {
        let (status, body) = mapping.dispatch(path, query);
        println!("GET {path}?{query} -> {status} {body}");
    }

    Ok(())
}
