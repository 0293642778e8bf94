use std::{any::type_name, marker::PhantomData, sync::Arc};

use grove_di::{DynError, Injectable, Instance};

use crate::errors::AopError;

/// Builds the substitute for a bean from the bean and its handler
///
/// The substitute should be usable wherever the original is, usually a wrapper of the
/// same type delegating to the target.
pub trait ProxyFactory: Send + Sync {
    fn create_proxy(&self, target: Instance, handler: Instance) -> Result<Instance, DynError>;
}

impl<F> ProxyFactory for F
where
    F: Fn(Instance, Instance) -> Result<Instance, DynError> + Send + Sync,
{
    fn create_proxy(&self, target: Instance, handler: Instance) -> Result<Instance, DynError> {
        self(target, handler)
    }
}

/// A [ProxyFactory] for targets of type `T` and handlers of type `H`
///
/// Fails with [AopError] if either does not have the expected type.
pub struct TypedProxyFactory<T, H, F> {
    build: F,
    _types: PhantomData<fn(Arc<T>, Arc<H>)>,
}

impl<T, H, P, F> TypedProxyFactory<T, H, F>
where
    T: Injectable,
    H: Injectable,
    P: Injectable,
    F: Fn(Arc<T>, Arc<H>) -> P + Send + Sync,
{
    pub fn new(build: F) -> Self {
        TypedProxyFactory {
            build,
            _types: PhantomData,
        }
    }
}

impl<T, H, P, F> ProxyFactory for TypedProxyFactory<T, H, F>
where
    T: Injectable,
    H: Injectable,
    P: Injectable,
    F: Fn(Arc<T>, Arc<H>) -> P + Send + Sync,
{
    fn create_proxy(&self, target: Instance, handler: Instance) -> Result<Instance, DynError> {
        let handler = handler
            .downcast::<H>()
            .map_err(|actual| AopError::HandlerNotOfType {
                expected: type_name::<H>(),
                actual,
            })?;
        let target = target
            .downcast::<T>()
            .map_err(|actual| AopError::TargetNotOfType {
                expected: type_name::<T>(),
                actual,
            })?;
        Ok(Instance::new((self.build)(target, handler)))
    }
}
