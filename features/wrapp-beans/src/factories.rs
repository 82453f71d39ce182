use std::any::Any;

use crate::{
    resolver::{Arguments, Resolver},
    types::{DependencyInfo, DynError, Injectable, Instance},
};

/// A function constructing a bean from its resolved dependencies
///
/// Implemented for any `Fn(Arc<A>, Arc<B>, ..) -> T` with up to eight dependencies.
pub trait Constructor<Args>: Send + Sync + 'static {
    type Output: Injectable;

    /// Returns a list of dependencies the constructor requires, in parameter order
    fn dependencies() -> Vec<DependencyInfo>;

    /// Constructs a new instance from the resolved dependencies
    fn construct(&self, args: Arguments) -> Result<Self::Output, DynError>;
}

/// A fallible [Constructor], implemented for any `Fn(Arc<A>, ..) -> Result<T, E>`
pub trait TryConstructor<Args>: Send + Sync + 'static {
    type Output: Injectable;

    fn dependencies() -> Vec<DependencyInfo>;

    fn construct(&self, args: Arguments) -> Result<Self::Output, DynError>;
}

/// A factory method of a configuration provider `C`
///
/// Implemented for any `Fn(&C, Arc<A>, ..) -> T`, e.g. a method `fn data_source(&self) -> DataSource`.
pub trait BeanMethod<C, Args>: Send + Sync + 'static {
    type Output: Injectable;

    fn dependencies() -> Vec<DependencyInfo>;

    fn invoke(&self, provider: &C, args: Arguments) -> Result<Self::Output, DynError>;
}

/// A fallible [BeanMethod], implemented for any `Fn(&C, Arc<A>, ..) -> Result<T, E>`
pub trait TryBeanMethod<C, Args>: Send + Sync + 'static {
    type Output: Injectable;

    fn dependencies() -> Vec<DependencyInfo>;

    fn invoke(&self, provider: &C, args: Arguments) -> Result<Self::Output, DynError>;
}

macro_rules! define_constructor ({ $($param:ident)* } => {
    impl<F, T, $($param,)*> Constructor<($($param,)*)> for F
    where
        F: Fn($($param),*) -> T + Send + Sync + 'static,
        T: Injectable,
        $($param: Resolver,)*
    {
        type Output = T;

        fn dependencies() -> Vec<DependencyInfo> {
            vec![$($param::dependency_info(),)*]
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        fn construct(&self, mut args: Arguments) -> Result<T, DynError> {
            $(let $param = args.take::<$param>()?;)*
            Ok((self)($($param),*))
        }
    }

    impl<F, T, E, $($param,)*> TryConstructor<($($param,)*)> for F
    where
        F: Fn($($param),*) -> Result<T, E> + Send + Sync + 'static,
        T: Injectable,
        E: Into<DynError>,
        $($param: Resolver,)*
    {
        type Output = T;

        fn dependencies() -> Vec<DependencyInfo> {
            vec![$($param::dependency_info(),)*]
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        fn construct(&self, mut args: Arguments) -> Result<T, DynError> {
            $(let $param = args.take::<$param>()?;)*
            (self)($($param),*).map_err(Into::into)
        }
    }

    impl<C, F, T, $($param,)*> BeanMethod<C, ($($param,)*)> for F
    where
        F: Fn(&C, $($param),*) -> T + Send + Sync + 'static,
        T: Injectable,
        $($param: Resolver,)*
    {
        type Output = T;

        fn dependencies() -> Vec<DependencyInfo> {
            vec![$($param::dependency_info(),)*]
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        fn invoke(&self, provider: &C, mut args: Arguments) -> Result<T, DynError> {
            $(let $param = args.take::<$param>()?;)*
            Ok((self)(provider, $($param),*))
        }
    }

    impl<C, F, T, E, $($param,)*> TryBeanMethod<C, ($($param,)*)> for F
    where
        F: Fn(&C, $($param),*) -> Result<T, E> + Send + Sync + 'static,
        T: Injectable,
        E: Into<DynError>,
        $($param: Resolver,)*
    {
        type Output = T;

        fn dependencies() -> Vec<DependencyInfo> {
            vec![$($param::dependency_info(),)*]
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        fn invoke(&self, provider: &C, mut args: Arguments) -> Result<T, DynError> {
            $(let $param = args.take::<$param>()?;)*
            (self)(provider, $($param),*).map_err(Into::into)
        }
    }
});

define_constructor! {}
define_constructor! { A1 }
define_constructor! { A1 A2 }
define_constructor! { A1 A2 A3 }
define_constructor! { A1 A2 A3 A4 }
define_constructor! { A1 A2 A3 A4 A5 }
define_constructor! { A1 A2 A3 A4 A5 A6 }
define_constructor! { A1 A2 A3 A4 A5 A6 A7 }
define_constructor! { A1 A2 A3 A4 A5 A6 A7 A8 }

/// Type erased constructor
pub(crate) type DynConstruct = Box<dyn Fn(Arguments) -> Result<Instance, DynError> + Send + Sync>;

/// Type erased factory method, receives the provider instance
pub(crate) type DynInvoke =
    Box<dyn Fn(&(dyn Any + Send + Sync), Arguments) -> Result<Instance, DynError> + Send + Sync>;

pub(crate) fn erase_constructor<Args, F: Constructor<Args>>(constructor: F) -> DynConstruct {
    Box::new(move |args| constructor.construct(args).map(Instance::new))
}

pub(crate) fn erase_try_constructor<Args, F: TryConstructor<Args>>(constructor: F) -> DynConstruct {
    Box::new(move |args| constructor.construct(args).map(Instance::new))
}

pub(crate) fn erase_bean_method<C, Args, F>(method: F) -> DynInvoke
where
    C: Injectable,
    F: BeanMethod<C, Args>,
{
    Box::new(move |provider, args| {
        let provider = downcast_provider::<C>(provider)?;
        method.invoke(provider, args).map(Instance::new)
    })
}

pub(crate) fn erase_try_bean_method<C, Args, F>(method: F) -> DynInvoke
where
    C: Injectable,
    F: TryBeanMethod<C, Args>,
{
    Box::new(move |provider, args| {
        let provider = downcast_provider::<C>(provider)?;
        method.invoke(provider, args).map(Instance::new)
    })
}

fn downcast_provider<C: Injectable>(provider: &(dyn Any + Send + Sync)) -> Result<&C, DynError> {
    provider.downcast_ref::<C>().ok_or_else(|| {
        format!(
            "configuration provider is not a '{}'",
            std::any::type_name::<C>()
        )
        .into()
    })
}
