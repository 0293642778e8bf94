use std::{any::type_name, fmt::Debug, sync::Arc};

use crate::{
    catalog::TypeCatalog,
    definition::{reader::DefinitionReader, BeanDefinition},
    errors::{ContextError, RequireError},
    initiator::{invoke_hook, Initiator},
    processor::PostProcessorChain,
    property::PropertySource,
    registry::BeanRegistry,
    scan::{scan_for_type_names, ComponentScanner},
    types::{Injectable, Instance, TypeInfo},
};

/// Container holding all fully wired singleton beans
///
/// Once built, the context is read only and may be shared across threads.
pub struct ApplicationContext {
    registry: BeanRegistry,
    chain: PostProcessorChain,
}
impl Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("ApplicationContext");
        for definition in self.registry.definitions() {
            map.field(definition.name(), &definition.declared().type_name);
        }
        map.finish()
    }
}

impl ApplicationContext {
    /// Scans from `config_type`, then defines, creates and wires every component found
    pub fn new(
        config_type: TypeInfo,
        catalog: TypeCatalog,
        properties: Arc<dyn PropertySource>,
        scanner: &dyn ComponentScanner,
    ) -> Result<Self, ContextError> {
        let type_names = scan_for_type_names(config_type, &catalog, scanner)?;
        Self::from_type_names(type_names, catalog, properties)
    }

    /// Defines, creates and wires the components among `type_names`, without scanning
    pub fn from_type_names<I, S>(
        type_names: I,
        catalog: TypeCatalog,
        properties: Arc<dyn PropertySource>,
    ) -> Result<Self, ContextError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let definitions = DefinitionReader::new(&catalog).read(type_names)?;
        let registry = BeanRegistry::new(Arc::new(catalog), definitions);
        let (registry, chain) = Initiator::new(registry, properties).initiate()?;
        tracing::info!("Application context started with {} beans", registry.len());
        Ok(ApplicationContext { registry, chain })
    }

    pub fn catalog(&self) -> &TypeCatalog {
        self.registry.catalog()
    }

    pub fn contains_bean(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Bean names in (order, name) order
    pub fn bean_names(&self) -> Vec<&str> {
        self.registry
            .definitions()
            .into_iter()
            .map(BeanDefinition::name)
            .collect()
    }

    pub fn find_definition(&self, name: &str) -> Option<&BeanDefinition> {
        self.registry.find_definition(name)
    }

    pub fn find_definitions(&self, ty: TypeInfo) -> Vec<&BeanDefinition> {
        self.registry.find_definitions(ty)
    }

    /// The bean named `name`, possibly a substitute installed by a post processor
    pub fn get_bean(&self, name: &str) -> Result<Instance, ContextError> {
        let definition = self
            .registry
            .find_definition(name)
            .ok_or_else(|| RequireError::NoSuchBeanNamed(name.to_string()))?;
        Ok(definition.required_instance()?.clone())
    }

    /// The bean named `name`, which must be declared as assignable to `ty`
    pub fn get_bean_by_name_and_type(
        &self,
        name: &str,
        ty: TypeInfo,
    ) -> Result<Instance, ContextError> {
        let definition = self
            .registry
            .find_definition_typed(name, ty)?
            .ok_or_else(|| RequireError::NoSuchBeanNamed(name.to_string()))?;
        Ok(definition.required_instance()?.clone())
    }

    /// The unique bean assignable to `ty`, see [BeanRegistry::find_definition_by_type]
    pub fn get_bean_by_type(&self, ty: TypeInfo) -> Result<Instance, ContextError> {
        let definition = self
            .registry
            .find_definition_by_type(ty)?
            .ok_or(RequireError::NoSuchBeanOfType(ty.type_name))?;
        Ok(definition.required_instance()?.clone())
    }

    /// All beans assignable to `ty`, in (order, name) order
    pub fn get_beans(&self, ty: TypeInfo) -> Result<Vec<Instance>, ContextError> {
        self.registry
            .find_definitions(ty)
            .into_iter()
            .map(|definition| definition.required_instance().cloned())
            .collect()
    }

    /// Typed [ApplicationContext::get_bean_by_name_and_type]
    ///
    /// Fails with [RequireError::DowncastFailed] if a post processor replaced the bean
    /// with an instance of another type.
    pub fn get_bean_named<T: Injectable>(&self, name: &str) -> Result<Arc<T>, ContextError> {
        let instance = self.get_bean_by_name_and_type(name, TypeInfo::of::<T>())?;
        Ok(downcast(&instance)?)
    }

    /// Typed [ApplicationContext::get_bean_by_type]
    pub fn get_bean_of<T: Injectable>(&self) -> Result<Arc<T>, ContextError> {
        let instance = self.get_bean_by_type(TypeInfo::of::<T>())?;
        Ok(downcast(&instance)?)
    }

    /// Typed [ApplicationContext::get_beans]
    pub fn get_beans_of<T: Injectable>(&self) -> Result<Vec<Arc<T>>, ContextError> {
        self.get_beans(TypeInfo::of::<T>())?
            .iter()
            .map(|instance| downcast(instance).map_err(ContextError::from))
            .collect()
    }

    /// Runs the destroy callbacks of all beans and empties the context
    ///
    /// Callbacks run on the instance behind any substitute. Every bean is attempted,
    /// the first failure is returned.
    pub fn close(&mut self) -> Result<(), ContextError> {
        tracing::info!("Closing application context");
        let mut first_error = None;
        for definition in self.registry.definitions() {
            let Some(instance) = definition.instance() else {
                continue;
            };
            let original = self.chain.restore_original(instance, definition.name());
            let destroyed = invoke_hook(
                self.registry.catalog(),
                definition.name(),
                definition.declared(),
                &original,
                definition.destroy_hook(),
            );
            if let Err(error) = destroyed {
                tracing::error!("Destroying bean '{}' failed: {error}", definition.name());
                first_error.get_or_insert(error);
            }
        }
        self.registry.clear();
        tracing::info!("Application context closed");
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn downcast<T: Injectable>(instance: &Instance) -> Result<Arc<T>, RequireError> {
    instance
        .downcast::<T>()
        .map_err(|actual_type| RequireError::DowncastFailed {
            required_type: type_name::<T>(),
            actual_type,
        })
}
