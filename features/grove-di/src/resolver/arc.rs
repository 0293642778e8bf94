use std::{any::type_name, sync::Arc};

use crate::{
    errors::RequireError,
    resolver::{Args, Resolver},
    types::{Injectable, Instance},
};

impl<T: Injectable> Resolver for Arc<T> {
    fn resolve(argument: Option<&Instance>) -> Result<Self, RequireError> {
        let resolved = argument.ok_or(RequireError::NoSuchBeanOfType(type_name::<T>()))?;
        resolved
            .downcast::<T>()
            .map_err(|actual_type| RequireError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }
}

impl<Resolvable: Resolver> Resolver for Option<Resolvable> {
    fn resolve(argument: Option<&Instance>) -> Result<Self, RequireError> {
        // Nothing injected is fine for an Option, a wrong type is not
        match argument {
            Some(_) => Resolvable::resolve(argument).map(Some),
            None => Ok(None),
        }
    }
}

impl Args {
    /// Resolves a required bean argument
    pub fn bean<T: Injectable>(&self, index: usize) -> Result<Arc<T>, RequireError> {
        self.resolve(index)
    }

    /// Resolves an optional bean argument, `None` if nothing was injected
    pub fn optional_bean<T: Injectable>(
        &self,
        index: usize,
    ) -> Result<Option<Arc<T>>, RequireError> {
        self.resolve(index)
    }

    /// Resolves a scalar argument, e.g. one injected from a property
    pub fn value<T: Injectable + Clone>(&self, index: usize) -> Result<T, RequireError> {
        self.resolve::<Arc<T>>(index).map(|value| T::clone(&value))
    }
}
