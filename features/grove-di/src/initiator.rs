use std::{collections::HashSet, sync::Arc};

use crate::{
    catalog::{
        annotation::{self, Annotation, AnnotationKind},
        descriptor::{FieldDescriptor, MethodDescriptor, ParamDescriptor},
        TypeCatalog,
    },
    definition::{BeanDefinition, ConstructionStrategy, LifecycleHook},
    errors::{ContextError, DefinitionError, DependencyError, RequireError},
    processor::{BeanPostProcessor, PostProcessorChain},
    property::PropertySource,
    registry::BeanRegistry,
    resolver::Args,
    types::{Instance, TypeInfo},
};

/// Runs the staged construction of all beans in a registry
///
/// 1. configuration beans
/// 2. post processors, which then form the chain
/// 3. everything else
/// 4. field and setter injection, into the instance behind any substitute
/// 5. init callbacks and `after_initialization`
///
/// Every phase walks the definitions in (order, name) order.
pub(crate) struct Initiator {
    registry: BeanRegistry,
    properties: Arc<dyn PropertySource>,
    chain: PostProcessorChain,
    /// Beans whose construction is in progress on the current call stack
    creating: HashSet<String>,
}

impl Initiator {
    pub(crate) fn new(registry: BeanRegistry, properties: Arc<dyn PropertySource>) -> Self {
        Initiator {
            registry,
            properties,
            chain: PostProcessorChain::default(),
            creating: HashSet::new(),
        }
    }

    pub(crate) fn initiate(mut self) -> Result<(BeanRegistry, PostProcessorChain), ContextError> {
        tracing::debug!(
            "Initializing context with {} bean definitions",
            self.registry.len()
        );

        let mut configurations = Vec::new();
        for definition in self.registry.definitions() {
            if is_configuration(self.registry.catalog(), definition.declared())? {
                configurations.push(definition.name().to_string());
            }
        }
        for name in &configurations {
            self.create_early_singleton(name)?;
        }

        let catalog = self.registry.catalog();
        let processor_names = self.registry.names_where(|definition| {
            catalog
                .describe(definition.declared())
                .is_some_and(|descriptor| descriptor.is_post_processor())
        });
        let mut processors = Vec::with_capacity(processor_names.len());
        for name in &processor_names {
            let instance = self.create_early_singleton(name)?;
            processors.push((name, self.as_post_processor(name, &instance)?));
        }
        for (name, processor) in processors {
            self.chain.push(name, processor);
        }
        tracing::debug!("{} post processors registered", self.chain.len());

        let remaining = self
            .registry
            .names_where(|definition| definition.instance().is_none());
        for name in &remaining {
            self.create_early_singleton(name)?;
        }

        let all = self.registry.names_where(|_| true);
        for name in &all {
            self.inject_properties(name)?;
        }
        for name in &all {
            self.initialize(name)?;
        }

        tracing::debug!("All {} beans initialized", all.len());
        Ok((self.registry, self.chain))
    }

    fn definition(&self, name: &str) -> Result<&BeanDefinition, ContextError> {
        self.registry
            .find_definition(name)
            .ok_or_else(|| RequireError::NoSuchBeanNamed(name.to_string()).into())
    }

    fn store(&mut self, name: &str, instance: Instance) -> Result<(), ContextError> {
        let definition = self
            .registry
            .find_definition_mut(name)
            .ok_or_else(|| RequireError::NoSuchBeanNamed(name.to_string()))?;
        definition.set_instance(instance);
        Ok(())
    }

    /// Returns the instance of `name`, creating it and its constructor dependencies first
    ///
    /// Fails if `name` is already being created further up the call stack.
    fn create_early_singleton(&mut self, name: &str) -> Result<Instance, ContextError> {
        let definition = self.definition(name)?;
        if let Some(instance) = definition.instance() {
            return Ok(instance.clone());
        }
        let type_name = definition.declared().type_name;

        if !self.creating.insert(name.to_string()) {
            return Err(DependencyError::CircularDependency {
                bean: name.to_string(),
                type_name,
            }
            .into());
        }
        let created = self.create(name);
        self.creating.remove(name);
        created
    }

    fn create(&mut self, name: &str) -> Result<Instance, ContextError> {
        let (declared, strategy) = {
            let definition = self.definition(name)?;
            (definition.declared(), definition.strategy().clone())
        };
        tracing::debug!("Creating bean '{name}' ({declared}) as early singleton");

        let configuration = is_configuration(self.registry.catalog(), declared)?;
        let mut arguments = Vec::with_capacity(strategy.params().len());
        for param in strategy.params() {
            arguments.push(self.resolve_param(name, declared, param, configuration)?);
        }
        let args = Args::new(arguments);

        let instance = match &strategy {
            ConstructionStrategy::Constructor(constructor) => {
                constructor.invoke(&args).map_err(|source| {
                    ContextError::creation_caused(
                        name,
                        declared.type_name,
                        "constructor failed",
                        source,
                    )
                })?
            }
            ConstructionStrategy::FactoryMethod { owner, method } => {
                let owner = self.create_early_singleton(owner)?;
                method
                    .invoke(&owner, &args)
                    .map_err(|source| {
                        ContextError::creation_caused(
                            name,
                            declared.type_name,
                            format!("factory method '{}' failed", method.name),
                            source,
                        )
                    })?
                    .ok_or_else(|| {
                        ContextError::creation(
                            name,
                            declared.type_name,
                            format!("factory method '{}' returned nothing", method.name),
                        )
                    })?
            }
        };
        self.store(name, instance.clone())?;

        let chain = self.chain.clone();
        let mut current = instance;
        for entry in chain.entries() {
            let processed = {
                let mut context = CreationContext {
                    initiator: &mut *self,
                };
                entry
                    .processor
                    .before_initialization(current.clone(), name, &mut context)
            }
            .map_err(|source| {
                ContextError::creation_caused(
                    name,
                    declared.type_name,
                    format!("post processor '{}' failed", entry.bean_name),
                    source,
                )
            })?
            .ok_or_else(|| {
                ContextError::creation(
                    name,
                    declared.type_name,
                    format!("post processor '{}' returned no instance", entry.bean_name),
                )
            })?;

            if !processed.ptr_eq(&current) {
                tracing::debug!(
                    "Bean '{name}' replaced by post processor '{}' with {}",
                    entry.bean_name,
                    processed.info()
                );
                self.store(name, processed.clone())?;
                current = processed;
            }
        }

        Ok(current)
    }

    /// Argument for a constructor or factory method parameter
    fn resolve_param(
        &mut self,
        bean: &str,
        declared: TypeInfo,
        param: &ParamDescriptor,
        configuration: bool,
    ) -> Result<Option<Instance>, ContextError> {
        let value = annotation::find(&param.annotations, AnnotationKind::Value);
        let autowired = annotation::find(&param.annotations, AnnotationKind::Autowired);

        if configuration && autowired.is_some() {
            return Err(ContextError::creation(
                bean,
                declared.type_name,
                format!(
                    "cannot use @Autowired on parameter '{}' of a @Configuration bean",
                    param.name
                ),
            ));
        }
        if value.is_some() && autowired.is_some() {
            return Err(ContextError::creation(
                bean,
                declared.type_name,
                format!("both @Value and @Autowired on parameter '{}'", param.name),
            ));
        }

        match (value, autowired) {
            (Some(Annotation::Value(key)), _) => self.property(key, param.ty).map(Some),
            (_, Some(Annotation::Autowired { required, name })) => {
                let site = format!("resolving parameter '{}'", param.name);
                let Some(dependency) =
                    self.find_dependency(bean, declared, param.ty, *required, name, site)?
                else {
                    return Ok(None);
                };
                self.create_early_singleton(&dependency).map(Some)
            }
            _ => Err(ContextError::creation(
                bean,
                declared.type_name,
                format!("neither @Value nor @Autowired on parameter '{}'", param.name),
            )),
        }
    }

    fn property(&self, key: &str, ty: TypeInfo) -> Result<Instance, ContextError> {
        self.properties
            .get_required(key, ty)
            .map_err(|source| ContextError::Property {
                key: key.to_string(),
                source,
            })
    }

    /// Name of the bean to autowire, `None` if optional and missing
    fn find_dependency(
        &self,
        bean: &str,
        declared: TypeInfo,
        ty: TypeInfo,
        required: bool,
        name: &Option<String>,
        site: String,
    ) -> Result<Option<String>, ContextError> {
        let found = match name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => self.registry.find_definition_typed(name, ty)?,
            None => self.registry.find_definition_by_type(ty)?,
        };
        match found {
            Some(definition) => Ok(Some(definition.name().to_string())),
            None if required => Err(DependencyError::Unsatisfied {
                bean: bean.to_string(),
                type_name: declared.type_name,
                dependency: ty.type_name,
                site,
            }
            .into()),
            None => Ok(None),
        }
    }

    fn as_post_processor(
        &self,
        name: &str,
        instance: &Instance,
    ) -> Result<Arc<dyn BeanPostProcessor>, ContextError> {
        let catalog = self.registry.catalog();
        let declared = self.definition(name)?.declared();
        catalog
            .get_by_id(instance.info().type_id)
            .and_then(|descriptor| descriptor.as_post_processor(instance))
            .or_else(|| {
                catalog
                    .describe(declared)
                    .and_then(|descriptor| descriptor.as_post_processor(instance))
            })
            .ok_or_else(|| {
                ContextError::creation(name, declared.type_name, "instance is not a post processor")
            })
    }
}

/// Property injection
impl Initiator {
    fn inject_properties(&self, name: &str) -> Result<(), ContextError> {
        let definition = self.definition(name)?;
        let declared = definition.declared();
        let instance = definition.required_instance()?;
        let target = InjectionTarget {
            bean: name,
            declared,
            instance: self.chain.restore_original(instance, name),
        };

        // Fields first, then setters, from the declared type up through its superclasses
        let mut current = Some(declared);
        while let Some(info) = current {
            let Some(descriptor) = self.registry.catalog().describe(info) else {
                break;
            };
            for field in &descriptor.fields {
                self.inject_field(&target, info, field)?;
            }
            for method in &descriptor.methods {
                self.inject_method(&target, info, method)?;
            }
            current = descriptor.superclass;
        }
        Ok(())
    }

    fn inject_field(
        &self,
        target: &InjectionTarget<'_>,
        owner: TypeInfo,
        field: &FieldDescriptor,
    ) -> Result<(), ContextError> {
        if !is_injection_point(&field.annotations) {
            return Ok(());
        }
        let member = format!("field '{}'", field.name);
        if field.is_static {
            return Err(invalid_injection(owner, member, "static members cannot be injected"));
        }
        if field.is_final {
            return Err(invalid_injection(owner, member, "final fields cannot be injected"));
        }

        let Some(value) = self.injected_value(target, &field.annotations, field.ty, &member)? else {
            return Ok(());
        };
        tracing::debug!(
            "Injecting {owner}.{} of bean '{}'",
            field.name,
            target.bean
        );
        field.set(&target.instance, value).map_err(|source| {
            ContextError::creation_caused(
                target.bean,
                target.declared.type_name,
                format!("cannot set {member}"),
                source,
            )
        })
    }

    fn inject_method(
        &self,
        target: &InjectionTarget<'_>,
        owner: TypeInfo,
        method: &MethodDescriptor,
    ) -> Result<(), ContextError> {
        if !is_injection_point(&method.annotations) {
            return Ok(());
        }
        let member = format!("method '{}'", method.name);
        if method.is_static {
            return Err(invalid_injection(owner, member, "static members cannot be injected"));
        }
        if method.is_final {
            tracing::warn!(
                "Injecting final method {owner}.{} of bean '{}'",
                method.name,
                target.bean
            );
        }
        let [param] = method.params.as_slice() else {
            return Err(invalid_injection(owner, member, "cannot inject a non-setter method"));
        };

        let Some(value) =
            self.injected_value(target, &method.annotations, param.ty, &member)?
        else {
            return Ok(());
        };
        tracing::debug!(
            "Injecting {owner}.{}(..) of bean '{}'",
            method.name,
            target.bean
        );
        method
            .invoke(&target.instance, &Args::new(vec![Some(value)]))
            .map(|_| ())
            .map_err(|source| {
                ContextError::creation_caused(
                    target.bean,
                    target.declared.type_name,
                    format!("cannot invoke {member}"),
                    source,
                )
            })
    }

    /// Value for a field or setter, `None` for an optional dependency that is missing
    ///
    /// All beans exist by now, so nothing is created here.
    fn injected_value(
        &self,
        target: &InjectionTarget<'_>,
        annotations: &[Annotation],
        ty: TypeInfo,
        member: &str,
    ) -> Result<Option<Instance>, ContextError> {
        let value = annotation::find(annotations, AnnotationKind::Value);
        let autowired = annotation::find(annotations, AnnotationKind::Autowired);
        match (value, autowired) {
            (Some(_), Some(_)) => Err(ContextError::creation(
                target.bean,
                target.declared.type_name,
                format!("both @Value and @Autowired on {member}"),
            )),
            (Some(Annotation::Value(key)), _) => self.property(key, ty).map(Some),
            (_, Some(Annotation::Autowired { required, name })) => {
                let site = format!("injecting {member}");
                let dependency = self.find_dependency(
                    target.bean,
                    target.declared,
                    ty,
                    *required,
                    name,
                    site,
                )?;
                match dependency {
                    Some(dependency) => {
                        let definition = self.definition(&dependency)?;
                        Ok(Some(definition.required_instance()?.clone()))
                    }
                    None => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }
}

/// Init callbacks
impl Initiator {
    fn initialize(&mut self, name: &str) -> Result<(), ContextError> {
        let (declared, instance, hook) = {
            let definition = self.definition(name)?;
            (
                definition.declared(),
                definition.required_instance()?.clone(),
                definition.init_hook().clone(),
            )
        };
        invoke_hook(self.registry.catalog(), name, declared, &instance, &hook)?;

        let mut current = instance.clone();
        for entry in self.chain.entries() {
            let processed = entry
                .processor
                .after_initialization(current.clone(), name)
                .map_err(|source| {
                    ContextError::creation_caused(
                        name,
                        declared.type_name,
                        format!("post processor '{}' failed", entry.bean_name),
                        source,
                    )
                })?
                .ok_or_else(|| {
                    ContextError::creation(
                        name,
                        declared.type_name,
                        format!("post processor '{}' returned no instance", entry.bean_name),
                    )
                })?;
            if !processed.ptr_eq(&current) {
                tracing::debug!(
                    "Bean '{name}' replaced after initialization by post processor '{}'",
                    entry.bean_name
                );
                current = processed;
            }
        }
        if !current.ptr_eq(&instance) {
            self.store(name, current)?;
        }
        Ok(())
    }
}

struct InjectionTarget<'a> {
    bean: &'a str,
    declared: TypeInfo,
    /// The instance behind any substitute
    instance: Instance,
}

fn is_injection_point(annotations: &[Annotation]) -> bool {
    annotation::has(annotations, AnnotationKind::Value)
        || annotation::has(annotations, AnnotationKind::Autowired)
}

fn invalid_injection(owner: TypeInfo, member: String, reason: &'static str) -> ContextError {
    DefinitionError::InvalidInjectionPoint {
        type_name: owner.type_name,
        member,
        reason,
    }
    .into()
}

fn is_configuration(catalog: &TypeCatalog, info: TypeInfo) -> Result<bool, DefinitionError> {
    let Some(descriptor) = catalog.describe(info) else {
        return Ok(false);
    };
    let found = catalog.find_annotation(
        &descriptor.annotations,
        info.simple_name(),
        AnnotationKind::Configuration,
    )?;
    Ok(found.is_some())
}

/// Invokes an init or destroy callback on `instance`
///
/// Named callbacks are looked up on the runtime type of the instance and its superclasses.
pub(crate) fn invoke_hook(
    catalog: &TypeCatalog,
    bean: &str,
    declared: TypeInfo,
    instance: &Instance,
    hook: &LifecycleHook,
) -> Result<(), ContextError> {
    let method = match hook {
        LifecycleHook::None => return Ok(()),
        LifecycleHook::Method(method) => method.clone(),
        LifecycleHook::Named(method_name) => {
            find_named_method(catalog, instance.info(), method_name).ok_or_else(|| {
                DefinitionError::MethodNotFound {
                    type_name: instance.info().type_name,
                    method: method_name.clone(),
                }
            })?
        }
    };

    tracing::debug!("Invoking '{}' on bean '{bean}'", method.name);
    method
        .invoke(instance, &Args::empty())
        .map(|_| ())
        .map_err(|source| {
            ContextError::creation_caused(
                bean,
                declared.type_name,
                format!("lifecycle method '{}' failed", method.name),
                source,
            )
        })
}

fn find_named_method(
    catalog: &TypeCatalog,
    runtime: TypeInfo,
    name: &str,
) -> Option<Arc<MethodDescriptor>> {
    let mut current = catalog.describe(runtime);
    while let Some(descriptor) = current {
        if let Some(method) = descriptor.find_method(name) {
            return Some(method.clone());
        }
        current = descriptor
            .superclass
            .and_then(|superclass| catalog.describe(superclass));
    }
    None
}

/// Registry access handed to [BeanPostProcessor::before_initialization]
///
/// Only valid while the context is being built.
pub struct CreationContext<'a> {
    initiator: &'a mut Initiator,
}

impl CreationContext<'_> {
    pub fn catalog(&self) -> &TypeCatalog {
        self.initiator.registry.catalog()
    }

    pub fn contains_bean(&self, name: &str) -> bool {
        self.initiator.registry.contains(name)
    }

    pub fn find_definition(&self, name: &str) -> Option<&BeanDefinition> {
        self.initiator.registry.find_definition(name)
    }

    pub fn find_definitions(&self, ty: TypeInfo) -> Vec<&BeanDefinition> {
        self.initiator.registry.find_definitions(ty)
    }

    pub fn find_definition_by_type(
        &self,
        ty: TypeInfo,
    ) -> Result<Option<&BeanDefinition>, RequireError> {
        self.initiator.registry.find_definition_by_type(ty)
    }

    /// The instance of `name`, created right away if it does not exist yet
    pub fn get_or_create_bean(&mut self, name: &str) -> Result<Instance, ContextError> {
        self.initiator.create_early_singleton(name)
    }

    /// Resolves a property through the context's property source
    pub fn property(&self, key: &str, ty: TypeInfo) -> Result<Instance, ContextError> {
        self.initiator.property(key, ty)
    }
}
