use std::sync::Arc;

use crate::{
    resolver::Resolver,
    types::{DependencyInfo, Injectable, Instance},
};

impl<T: ?Sized + Injectable> Resolver for Arc<T> {
    fn from_instance(instance: &Instance) -> Option<Self> {
        instance.downcast::<T>()
    }

    fn dependency_info() -> DependencyInfo {
        DependencyInfo::of::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Arguments;

    #[test]
    fn arguments_are_taken_in_order() {
        let mut args = Arguments::new(vec![Instance::new(1_u32), Instance::new("two")]);

        assert_eq!(*args.take::<Arc<u32>>().unwrap(), 1);
        assert_eq!(*args.take::<Arc<&'static str>>().unwrap(), "two");
        assert!(args.is_empty());
    }

    #[test]
    fn mismatched_argument_reports_its_position() {
        let mut args = Arguments::new(vec![Instance::new(1_u32)]);

        let err = args.take::<Arc<String>>().unwrap_err();
        assert_eq!(err.position, 0);

        let err = args.take::<Arc<u32>>().unwrap_err();
        assert_eq!(err.position, 1);
    }
}
