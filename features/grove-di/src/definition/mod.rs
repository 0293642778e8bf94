use std::{fmt::Debug, sync::Arc};

use crate::{
    catalog::descriptor::{ConstructorDescriptor, MethodDescriptor, ParamDescriptor},
    errors::ContextError,
    types::{Instance, TypeInfo},
};

pub mod reader;

/// Order of a bean without an `@Order` marker
pub const DEFAULT_ORDER: i32 = i32::MAX;

/// How the instance of a bean is produced
#[derive(Clone)]
pub enum ConstructionStrategy {
    Constructor(Arc<ConstructorDescriptor>),
    /// A `@Bean` method invoked on the configuration bean named `owner`
    FactoryMethod {
        owner: String,
        method: Arc<MethodDescriptor>,
    },
}
impl Debug for ConstructionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructionStrategy::Constructor(_) => f.write_str("Constructor"),
            ConstructionStrategy::FactoryMethod { owner, method } => {
                write!(f, "FactoryMethod({owner}.{})", method.name)
            }
        }
    }
}

impl ConstructionStrategy {
    pub fn params(&self) -> &[ParamDescriptor] {
        match self {
            ConstructionStrategy::Constructor(constructor) => &constructor.params,
            ConstructionStrategy::FactoryMethod { method, .. } => &method.params,
        }
    }
}

/// Init or destroy callback of a bean
///
/// Constructor built beans know the method up front. Factory built beans only know
/// its name, which is looked up on the runtime type once the instance exists.
#[derive(Clone, Default)]
pub enum LifecycleHook {
    #[default]
    None,
    Method(Arc<MethodDescriptor>),
    Named(String),
}
impl Debug for LifecycleHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleHook::None => f.write_str("None"),
            LifecycleHook::Method(method) => write!(f, "Method({})", method.name),
            LifecycleHook::Named(name) => write!(f, "Named({name})"),
        }
    }
}

impl LifecycleHook {
    pub fn is_none(&self) -> bool {
        matches!(self, LifecycleHook::None)
    }
}

/// Recipe and metadata of a single bean, plus its instance once created
#[derive(Debug, Clone)]
pub struct BeanDefinition {
    name: String,
    declared: TypeInfo,
    strategy: ConstructionStrategy,
    order: i32,
    primary: bool,
    init: LifecycleHook,
    destroy: LifecycleHook,
    instance: Option<Instance>,
}

impl BeanDefinition {
    /// Bean created through a constructor of its own type
    pub fn constructed(
        name: String,
        declared: TypeInfo,
        constructor: Arc<ConstructorDescriptor>,
        order: i32,
        primary: bool,
        init: Option<Arc<MethodDescriptor>>,
        destroy: Option<Arc<MethodDescriptor>>,
    ) -> Self {
        BeanDefinition {
            name,
            declared,
            strategy: ConstructionStrategy::Constructor(constructor),
            order,
            primary,
            init: init.map_or(LifecycleHook::None, LifecycleHook::Method),
            destroy: destroy.map_or(LifecycleHook::None, LifecycleHook::Method),
            instance: None,
        }
    }

    /// Bean produced by the `@Bean` method `method` of the configuration bean `owner`
    #[allow(clippy::too_many_arguments)]
    pub fn factory(
        name: String,
        declared: TypeInfo,
        owner: String,
        method: Arc<MethodDescriptor>,
        order: i32,
        primary: bool,
        init: Option<String>,
        destroy: Option<String>,
    ) -> Self {
        BeanDefinition {
            name,
            declared,
            strategy: ConstructionStrategy::FactoryMethod { owner, method },
            order,
            primary,
            init: init.map_or(LifecycleHook::None, LifecycleHook::Named),
            destroy: destroy.map_or(LifecycleHook::None, LifecycleHook::Named),
            instance: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type used when looking this bean up by type
    pub fn declared(&self) -> TypeInfo {
        self.declared
    }

    pub fn strategy(&self) -> &ConstructionStrategy {
        &self.strategy
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn init_hook(&self) -> &LifecycleHook {
        &self.init
    }

    pub fn destroy_hook(&self) -> &LifecycleHook {
        &self.destroy
    }

    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    /// The instance, failing if the bean was not created yet
    pub fn required_instance(&self) -> Result<&Instance, ContextError> {
        self.instance.as_ref().ok_or_else(|| {
            ContextError::creation(
                &self.name,
                self.declared.type_name,
                "instance has not been created yet",
            )
        })
    }

    pub(crate) fn set_instance(&mut self, instance: Instance) {
        self.instance = Some(instance);
    }

    pub(crate) fn clear_instance(&mut self) {
        self.instance = None;
    }

    /// Key every construction phase iterates by
    pub fn sort_key(&self) -> (i32, &str) {
        (self.order, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::descriptor::ConstructorDescriptor;

    struct Repo;

    fn definition(name: &str, order: i32) -> BeanDefinition {
        BeanDefinition::constructed(
            name.to_string(),
            TypeInfo::of::<Repo>(),
            Arc::new(ConstructorDescriptor::new(|_| Ok(Repo))),
            order,
            false,
            None,
            None,
        )
    }

    #[test]
    fn sorts_by_order_then_name() {
        let mut definitions = vec![
            definition("b", DEFAULT_ORDER),
            definition("a", DEFAULT_ORDER),
            definition("z", 1),
        ];
        definitions.sort_by(|left, right| left.sort_key().cmp(&right.sort_key()));
        let names: Vec<_> = definitions.iter().map(BeanDefinition::name).collect();
        assert_eq!(names, vec!["z", "a", "b"]);
    }

    #[test]
    fn unset_instance_is_an_error() {
        let mut definition = definition("repo", DEFAULT_ORDER);
        assert!(definition.required_instance().is_err());

        definition.set_instance(Instance::new(Repo));
        assert!(definition.required_instance().unwrap().is::<Repo>());
        assert!(definition.init_hook().is_none());
    }
}
