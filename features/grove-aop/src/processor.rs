use std::{
    collections::HashMap,
    marker::PhantomData,
    sync::{Arc, Mutex, PoisonError},
};

use grove_di::{
    catalog::{
        annotation::Annotation,
        descriptor::{ConstructorDescriptor, TypeDescriptor},
    },
    BeanPostProcessor, CreationContext, DynError, Instance, TypeInfo,
};

use crate::{errors::AopError, proxy::ProxyFactory};

/// Replaces beans whose type carries the annotation `A` with a proxy
///
/// The annotation value names the handler bean, e.g. `@Around("tracing")` proxies the bean
/// with the handler bean `tracing`. The handler is created early if it does not exist yet.
/// Originals are remembered so values are injected into them rather than into the proxy.
pub struct AnnotationProxyPostProcessor<A> {
    factory: Arc<dyn ProxyFactory>,
    originals: Mutex<HashMap<String, Instance>>,
    _annotation: PhantomData<fn() -> A>,
}

impl<A: 'static> AnnotationProxyPostProcessor<A> {
    pub fn new(factory: impl ProxyFactory + 'static) -> Self {
        Self::with_shared(Arc::new(factory))
    }

    pub fn with_shared(factory: Arc<dyn ProxyFactory>) -> Self {
        AnnotationProxyPostProcessor {
            factory,
            originals: Mutex::default(),
            _annotation: PhantomData,
        }
    }

    /// Describes the post processor as a component named `name`
    pub fn descriptor(name: &str, factory: impl ProxyFactory + 'static) -> TypeDescriptor {
        let factory: Arc<dyn ProxyFactory> = Arc::new(factory);
        TypeDescriptor::class::<Self>()
            .component_named(name)
            .constructor(ConstructorDescriptor::new(move |_| {
                Ok(Self::with_shared(factory.clone()))
            }))
            .post_processor::<Self>()
    }

    pub fn annotation(&self) -> TypeInfo {
        TypeInfo::of::<A>()
    }

    /// Whether `bean_name` was replaced by a proxy
    pub fn is_proxied(&self, bean_name: &str) -> bool {
        self.originals().contains_key(bean_name)
    }

    fn originals(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instance>> {
        self.originals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The annotation value on the runtime type of `bean`, `None` if not annotated
    fn handler_name(
        &self,
        context: &CreationContext<'_>,
        bean: &Instance,
        bean_name: &str,
    ) -> Result<Option<String>, AopError> {
        let annotation = self.annotation();
        let Some(descriptor) = context.catalog().describe(bean.info()) else {
            return Ok(None);
        };
        let value = descriptor.annotations.iter().find_map(|candidate| match candidate {
            Annotation::Custom {
                annotation: found,
                value,
            } if *found == annotation => Some(value),
            _ => None,
        });
        match value {
            None => Ok(None),
            Some(Some(handler)) if !handler.is_empty() => Ok(Some(handler.clone())),
            Some(_) => Err(AopError::MissingValue {
                annotation: annotation.simple_name(),
                bean: bean_name.to_string(),
            }),
        }
    }
}

impl<A: 'static> BeanPostProcessor for AnnotationProxyPostProcessor<A> {
    fn before_initialization(
        &self,
        bean: Instance,
        bean_name: &str,
        context: &mut CreationContext<'_>,
    ) -> Result<Option<Instance>, DynError> {
        let Some(handler_name) = self.handler_name(context, &bean, bean_name)? else {
            return Ok(Some(bean));
        };
        if !context.contains_bean(&handler_name) {
            return Err(AopError::HandlerNotFound {
                annotation: self.annotation().simple_name(),
                handler: handler_name,
            }
            .into());
        }
        let handler = context.get_or_create_bean(&handler_name)?;

        tracing::debug!(
            "Creating proxy for bean '{bean_name}' ({}) with handler '{handler_name}'",
            bean.info()
        );
        let proxy = self.factory.create_proxy(bean.clone(), handler)?;
        self.originals().insert(bean_name.to_string(), bean);
        Ok(Some(proxy))
    }

    fn on_set_property(&self, bean: Instance, bean_name: &str) -> Instance {
        self.originals().get(bean_name).cloned().unwrap_or(bean)
    }
}
