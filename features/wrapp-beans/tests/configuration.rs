use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use wrapp_beans::{
    BeanFactory, BeanMethods, BeanOrigin, Component, Configuration, InitError, RecipeKind, TypeInfo,
};

struct DataSource {
    url: String,
}

struct UserRepository {
    data_source: Arc<DataSource>,
}
struct OrderRepository {
    data_source: Arc<DataSource>,
}
struct AuditLog {
    data_source: Arc<DataSource>,
}

static DATA_SOURCES: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct DataSourceConfig;
impl DataSourceConfig {
    fn data_source(&self) -> DataSource {
        DATA_SOURCES.fetch_add(1, Ordering::SeqCst);
        DataSource {
            url: "jdbc:h2:mem:beans".to_string(),
        }
    }
}
impl Configuration for DataSourceConfig {
    fn beans(methods: &mut BeanMethods<Self>) {
        methods.bean(Self::data_source);
    }
}

#[test]
fn configured_bean_is_built_once_for_all_dependents() {
    let mut factory = BeanFactory::builder()
        .add_configuration::<DataSourceConfig>()
        .add_component(
            Component::<UserRepository>::new()
                .injectable(|data_source: Arc<DataSource>| UserRepository { data_source }),
        )
        .add_component(
            Component::<OrderRepository>::new()
                .injectable(|data_source: Arc<DataSource>| OrderRepository { data_source }),
        )
        .add_component(
            Component::<AuditLog>::new()
                .injectable(|data_source: Arc<DataSource>| AuditLog { data_source }),
        )
        .build();

    assert!(factory
        .declared_types()
        .contains(&TypeInfo::of::<DataSource>()));

    let before = DATA_SOURCES.load(Ordering::SeqCst);
    factory.initialize().unwrap();
    assert_eq!(DATA_SOURCES.load(Ordering::SeqCst), before + 1);

    let data_source = factory.get_bean::<DataSource>().unwrap();
    assert_eq!(data_source.url, "jdbc:h2:mem:beans");
    assert!(Arc::ptr_eq(
        &factory.get_bean::<UserRepository>().unwrap().data_source,
        &data_source
    ));
    assert!(Arc::ptr_eq(
        &factory.get_bean::<OrderRepository>().unwrap().data_source,
        &data_source
    ));
    assert!(Arc::ptr_eq(
        &factory.get_bean::<AuditLog>().unwrap().data_source,
        &data_source
    ));
}

struct Clock {
    source: &'static str,
}

#[derive(Default)]
struct ClockConfig;
impl Configuration for ClockConfig {
    fn beans(methods: &mut BeanMethods<Self>) {
        methods.bean(|_: &Self| Clock {
            source: "configuration",
        });
    }
}

#[test]
fn configuration_wins_over_the_constructor() {
    let container = BeanFactory::builder()
        .add_component(Component::<Clock>::new().no_arg(|| Clock {
            source: "constructor",
        }))
        .add_configuration::<ClockConfig>()
        .initialize()
        .unwrap();

    assert_eq!(container.get_bean::<Clock>().unwrap().source, "configuration");
    assert_eq!(
        container.graph().origin_of(TypeInfo::of::<Clock>()),
        Some(BeanOrigin::Configuration(TypeInfo::of::<ClockConfig>()))
    );
}

#[test]
fn factory_methods_receive_resolved_dependencies() {
    struct Pool {
        data_source: Arc<DataSource>,
        size: usize,
    }

    #[derive(Default)]
    struct PoolConfig;
    impl Configuration for PoolConfig {
        fn beans(methods: &mut BeanMethods<Self>) {
            methods.bean(|_: &Self, data_source: Arc<DataSource>| Pool {
                data_source,
                size: 4,
            });
        }
    }

    let container = BeanFactory::builder()
        .add_configuration::<PoolConfig>()
        .add_instance(DataSource {
            url: "jdbc:h2:mem:pool".to_string(),
        })
        .initialize()
        .unwrap();

    let pool = container.get_bean::<Pool>().unwrap();
    assert_eq!(pool.size, 4);
    assert!(Arc::ptr_eq(
        &pool.data_source,
        &container.get_bean::<DataSource>().unwrap()
    ));
    assert_eq!(
        container.graph().dependencies_of(TypeInfo::of::<Pool>()).unwrap(),
        &[TypeInfo::of::<DataSource>()]
    );
}

#[test]
fn two_methods_for_one_type_are_rejected() {
    #[derive(Default)]
    struct TwoClocks;
    impl Configuration for TwoClocks {
        fn beans(methods: &mut BeanMethods<Self>) {
            methods.bean(|_: &Self| Clock { source: "first" });
            methods.bean(|_: &Self| Clock { source: "second" });
        }
    }

    let mut factory = BeanFactory::builder()
        .add_configuration::<TwoClocks>()
        .build();

    match factory.initialize() {
        Err(InitError::AmbiguousProvider { product, providers }) => {
            assert_eq!(product, TypeInfo::of::<Clock>());
            assert_eq!(providers, vec![TypeInfo::of::<TwoClocks>(); 2]);
        }
        other => panic!("expected an ambiguous provider, got {other:?}"),
    }
}

#[test]
fn two_providers_for_one_type_are_rejected() {
    #[derive(Default)]
    struct OtherClockConfig;
    impl Configuration for OtherClockConfig {
        fn beans(methods: &mut BeanMethods<Self>) {
            methods.bean(|_: &Self| Clock { source: "other" });
        }
    }

    let mut factory = BeanFactory::builder()
        .add_configuration::<ClockConfig>()
        .add_configuration::<OtherClockConfig>()
        .build();

    assert!(matches!(
        factory.initialize(),
        Err(InitError::AmbiguousProvider { providers, .. }) if providers.len() == 2
    ));
}

#[test]
fn configured_beans_can_implement_interfaces() {
    trait Storage: Send + Sync {
        fn location(&self) -> String;
    }
    impl Storage for DataSource {
        fn location(&self) -> String {
            self.url.clone()
        }
    }

    #[derive(Default)]
    struct StorageConfig;
    impl Configuration for StorageConfig {
        fn beans(methods: &mut BeanMethods<Self>) {
            methods
                .bean(|_: &Self| DataSource {
                    url: "s3://beans".to_string(),
                })
                .implements::<dyn Storage>(|bean| bean);
        }
    }

    struct Uploader {
        storage: Arc<dyn Storage>,
    }

    let container = BeanFactory::builder()
        .add_configuration::<StorageConfig>()
        .add_component(
            Component::<Uploader>::new().injectable(|storage: Arc<dyn Storage>| Uploader { storage }),
        )
        .initialize()
        .unwrap();

    assert_eq!(
        container.get_bean::<Uploader>().unwrap().storage.location(),
        "s3://beans"
    );
    assert_eq!(
        container.graph().origin_of(TypeInfo::of::<Uploader>()),
        Some(BeanOrigin::Constructor(RecipeKind::Injectable))
    );
}

#[test]
fn failing_factory_method_is_an_invocation_error() {
    #[derive(Default)]
    struct BrokenConfig;
    impl Configuration for BrokenConfig {
        fn beans(methods: &mut BeanMethods<Self>) {
            methods.try_bean(|_: &Self| -> Result<DataSource, String> {
                Err("connection refused".to_string())
            });
        }
    }

    let mut factory = BeanFactory::builder()
        .add_configuration::<BrokenConfig>()
        .build();

    match factory.initialize() {
        Err(InitError::Invocation { product, error }) => {
            assert_eq!(product, TypeInfo::of::<DataSource>());
            assert_eq!(error.to_string(), "connection refused");
        }
        other => panic!("expected an invocation error, got {other:?}"),
    }
}
