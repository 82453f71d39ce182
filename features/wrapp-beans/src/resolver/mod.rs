use std::any::type_name;

use crate::{
    errors::ArgumentError,
    types::{DependencyInfo, Instance},
};

pub mod arc;

/// A constructor or factory method parameter which can be injected
pub trait Resolver: Sized {
    /// Converts the resolved dependency into the parameter
    fn from_instance(instance: &Instance) -> Option<Self>;

    fn dependency_info() -> DependencyInfo;
}

/// Resolved dependencies, in the order the constructor declared them
pub struct Arguments {
    values: std::vec::IntoIter<Instance>,
    position: usize,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Instance>) -> Self {
        Arguments {
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Takes the next argument
    pub fn take<T: Resolver>(&mut self) -> Result<T, ArgumentError> {
        let position = self.position;
        self.position += 1;

        self.values
            .next()
            .as_ref()
            .and_then(T::from_instance)
            .ok_or(ArgumentError {
                position,
                required_type: type_name::<T>(),
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }
}
