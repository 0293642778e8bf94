use std::sync::Arc;

use crate::{
    initiator::CreationContext,
    types::{DynError, Instance},
};

/// Extension hook which may substitute bean instances, e.g. with a proxy
///
/// Every hook defaults to identity. A processor that substitutes an instance in
/// [BeanPostProcessor::before_initialization] must hand the original back from
/// [BeanPostProcessor::on_set_property], so that property injection and destroy
/// callbacks reach the real object rather than its substitute.
///
/// Init callbacks run on the substitute. A substitute of a bean with an init callback
/// must therefore have the bean's own Rust type, e.g. an enum with a proxy variant,
/// or the callback fails on its receiver.
pub trait BeanPostProcessor: Send + Sync {
    /// Called right after a bean was constructed
    ///
    /// Returning `Ok(None)` aborts start-up. The context gives access to the registry,
    /// including creating other beans early.
    fn before_initialization(
        &self,
        bean: Instance,
        _bean_name: &str,
        _context: &mut CreationContext<'_>,
    ) -> Result<Option<Instance>, DynError> {
        Ok(Some(bean))
    }

    /// Called after the bean was injected and its init callback ran
    fn after_initialization(
        &self,
        bean: Instance,
        _bean_name: &str,
    ) -> Result<Option<Instance>, DynError> {
        Ok(Some(bean))
    }

    /// Given the current instance, returns the instance properties should be injected into
    fn on_set_property(&self, bean: Instance, _bean_name: &str) -> Instance {
        bean
    }
}

/// A post processor together with the name of the bean it was created from
#[derive(Clone)]
pub struct ChainEntry {
    pub bean_name: String,
    pub processor: Arc<dyn BeanPostProcessor>,
}

/// Post processors in registration order
#[derive(Clone, Default)]
pub struct PostProcessorChain {
    entries: Vec<ChainEntry>,
}

impl PostProcessorChain {
    pub fn push(&mut self, bean_name: &str, processor: Arc<dyn BeanPostProcessor>) {
        self.entries.push(ChainEntry {
            bean_name: bean_name.to_string(),
            processor,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    /// Undoes substitutions by walking the chain backwards through `on_set_property`
    pub fn restore_original(&self, instance: &Instance, bean_name: &str) -> Instance {
        let mut current = instance.clone();
        for entry in self.entries.iter().rev() {
            let restored = entry.processor.on_set_property(current.clone(), bean_name);
            if !restored.ptr_eq(&current) {
                tracing::debug!(
                    "Post processor '{}' redirects injection of '{bean_name}' from {} to {}",
                    entry.bean_name,
                    current.info(),
                    restored.info()
                );
                current = restored;
            }
        }
        current
    }
}
