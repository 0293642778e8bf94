use std::{collections::BTreeMap, sync::Arc};

use crate::{
    catalog::{
        annotation::{self, Annotation, AnnotationKind},
        descriptor::{ConstructorDescriptor, MethodDescriptor, TypeDescriptor, TypeKind, Visibility},
        TypeCatalog,
    },
    definition::{BeanDefinition, DEFAULT_ORDER},
    errors::DefinitionError,
};

/// Turns discovered type names into bean definitions, without instantiating anything
pub struct DefinitionReader<'a> {
    catalog: &'a TypeCatalog,
}

impl<'a> DefinitionReader<'a> {
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        DefinitionReader { catalog }
    }

    /// Builds the definitions of all components among `type_names`, keyed by bean name
    pub fn read<I, S>(
        &self,
        type_names: I,
    ) -> Result<BTreeMap<String, BeanDefinition>, DefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut definitions = BTreeMap::new();
        for type_name in type_names {
            let type_name = type_name.as_ref();
            let descriptor = self
                .catalog
                .get(type_name)
                .ok_or_else(|| DefinitionError::UnknownType(type_name.to_string()))?;
            self.read_type(descriptor, &mut definitions)?;
        }
        Ok(definitions)
    }

    fn read_type(
        &self,
        descriptor: &TypeDescriptor,
        definitions: &mut BTreeMap<String, BeanDefinition>,
    ) -> Result<(), DefinitionError> {
        let info = descriptor.info;
        if matches!(
            descriptor.kind,
            TypeKind::Annotation | TypeKind::Enum | TypeKind::Interface | TypeKind::Record
        ) {
            tracing::trace!("Skipping {info}, {:?} types cannot be components", descriptor.kind);
            return Ok(());
        }

        let component = self.catalog.find_annotation(
            &descriptor.annotations,
            info.simple_name(),
            AnnotationKind::Component,
        )?;
        if component.is_none() {
            return Ok(());
        }

        tracing::debug!("Found component: {info}");
        if descriptor.is_abstract {
            return Err(DefinitionError::InvalidComponent {
                type_name: info.type_name,
                reason: "abstract",
            });
        }
        if descriptor.visibility == Visibility::Private {
            return Err(DefinitionError::InvalidComponent {
                type_name: info.type_name,
                reason: "private",
            });
        }

        let bean_name = self.bean_name(descriptor)?;
        let definition = BeanDefinition::constructed(
            bean_name.clone(),
            info,
            suitable_constructor(descriptor)?,
            order_of(&descriptor.annotations),
            annotation::has(&descriptor.annotations, AnnotationKind::Primary),
            lifecycle_method(descriptor, AnnotationKind::PostConstruct)?,
            lifecycle_method(descriptor, AnnotationKind::PreDestroy)?,
        );
        add_definition(definitions, definition)?;

        let configuration = self.catalog.find_annotation(
            &descriptor.annotations,
            info.simple_name(),
            AnnotationKind::Configuration,
        )?;
        if configuration.is_some() {
            self.read_factory_methods(&bean_name, descriptor, definitions)?;
        }
        Ok(())
    }

    /// The explicit name of the component marker, else the default bean name
    fn bean_name(&self, descriptor: &TypeDescriptor) -> Result<String, DefinitionError> {
        let info = descriptor.info;
        let carrier = self.catalog.carrier_of(
            &descriptor.annotations,
            info.simple_name(),
            AnnotationKind::Component,
        )?;

        let explicit = match carrier {
            Some(Annotation::Component(name)) | Some(Annotation::Configuration(name)) => {
                name.clone()
            }
            Some(Annotation::Custom { annotation, value }) => match value {
                Some(value) => Some(value.clone()),
                None => {
                    return Err(DefinitionError::MalformedAnnotation {
                        annotation: annotation.simple_name().to_string(),
                        target: info.type_name.to_string(),
                        reason: "Cannot get annotation value",
                    })
                }
            },
            _ => None,
        };

        Ok(explicit
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| info.default_bean_name()))
    }

    fn read_factory_methods(
        &self,
        owner: &str,
        descriptor: &TypeDescriptor,
        definitions: &mut BTreeMap<String, BeanDefinition>,
    ) -> Result<(), DefinitionError> {
        let type_name = descriptor.info.type_name;
        for method in &descriptor.methods {
            let Some(Annotation::Bean {
                name,
                init_method,
                destroy_method,
            }) = annotation::find(&method.annotations, AnnotationKind::Bean)
            else {
                continue;
            };

            let invalid = |reason| DefinitionError::InvalidFactoryMethod {
                type_name,
                method: method.name.clone(),
                reason,
            };
            if method.is_abstract() {
                return Err(invalid("be abstract"));
            }
            if method.is_final {
                return Err(invalid("be final"));
            }
            if method.visibility == Visibility::Private {
                return Err(invalid("be private"));
            }
            if method.returns.is_unit() {
                return Err(invalid("return void"));
            }
            if method.returns.is_primitive() {
                return Err(invalid("return a primitive type"));
            }

            let bean_name = non_empty(name).unwrap_or_else(|| method.name.clone());
            let definition = BeanDefinition::factory(
                bean_name,
                method.returns,
                owner.to_string(),
                method.clone(),
                order_of(&method.annotations),
                annotation::has(&method.annotations, AnnotationKind::Primary),
                non_empty(init_method),
                non_empty(destroy_method),
            );
            tracing::debug!(
                "Defined bean '{}' by factory method {type_name}.{}",
                definition.name(),
                method.name
            );
            add_definition(definitions, definition)?;
        }
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|value| !value.is_empty())
}

fn order_of(annotations: &[Annotation]) -> i32 {
    match annotation::find(annotations, AnnotationKind::Order) {
        Some(Annotation::Order(order)) => *order,
        _ => DEFAULT_ORDER,
    }
}

fn add_definition(
    definitions: &mut BTreeMap<String, BeanDefinition>,
    definition: BeanDefinition,
) -> Result<(), DefinitionError> {
    if definitions.contains_key(definition.name()) {
        return Err(DefinitionError::DuplicateBeanName(definition.name().to_string()));
    }
    tracing::debug!(
        "Defined bean '{}' of type {}",
        definition.name(),
        definition.declared()
    );
    definitions.insert(definition.name().to_string(), definition);
    Ok(())
}

/// The public constructor, or the only declared one if there is no public constructor
fn suitable_constructor(
    descriptor: &TypeDescriptor,
) -> Result<Arc<ConstructorDescriptor>, DefinitionError> {
    let type_name = descriptor.info.type_name;
    let public: Vec<_> = descriptor
        .constructors
        .iter()
        .filter(|constructor| constructor.visibility == Visibility::Public)
        .collect();

    match public.as_slice() {
        [constructor] => Ok(Arc::clone(constructor)),
        [_, _, ..] => Err(DefinitionError::MultipleConstructors {
            type_name,
            kind: "public",
        }),
        [] => match descriptor.constructors.as_slice() {
            [constructor] => Ok(constructor.clone()),
            [] => Err(DefinitionError::NoConstructor(type_name)),
            _ => Err(DefinitionError::MultipleConstructors {
                type_name,
                kind: "declared",
            }),
        },
    }
}

/// The single zero argument method carrying `kind`, if any
fn lifecycle_method(
    descriptor: &TypeDescriptor,
    kind: AnnotationKind,
) -> Result<Option<Arc<MethodDescriptor>>, DefinitionError> {
    let type_name = descriptor.info.type_name;
    let mut marked = descriptor
        .methods
        .iter()
        .filter(|method| annotation::has(&method.annotations, kind));

    let Some(method) = marked.next() else {
        return Ok(None);
    };
    let invalid = |method: &str, reason| DefinitionError::InvalidLifecycleMethod {
        type_name,
        method: method.to_string(),
        annotation: kind.name(),
        reason,
    };
    if let Some(other) = marked.next() {
        return Err(invalid(&other.name, "only one method may carry this annotation"));
    }
    if !method.params.is_empty() {
        return Err(invalid(&method.name, "must not have any argument"));
    }
    if method.is_abstract() {
        return Err(invalid(&method.name, "has no body"));
    }
    Ok(Some(method.clone()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        catalog::descriptor::{MethodDescriptor, ParamDescriptor},
        definition::{ConstructionStrategy, LifecycleHook},
        types::TypeInfo,
    };

    struct Repo;
    struct Clock;
    struct AppConfig;
    struct Task;
    struct Stereotype;
    struct Unnamed;

    fn repo() -> TypeDescriptor {
        TypeDescriptor::class::<Repo>()
            .component()
            .constructor(ConstructorDescriptor::new(|_| Ok(Repo)))
    }

    fn config() -> TypeDescriptor {
        TypeDescriptor::class::<AppConfig>()
            .configuration()
            .order(1)
            .constructor(ConstructorDescriptor::new(|_| Ok(AppConfig)))
            .method(
                MethodDescriptor::factory::<AppConfig, Clock, _>("clock", |_, _| Ok(Clock))
                    .annotate(Annotation::Primary),
            )
            .method(
                MethodDescriptor::factory::<AppConfig, Task, _>("scheduler", |_, _| Ok(Task))
                    .param(ParamDescriptor::autowired::<Clock>("clock"))
                    .annotate(Annotation::Bean {
                        name: Some("tasks".into()),
                        init_method: Some("start".into()),
                        destroy_method: None,
                    }),
            )
    }

    fn read(
        catalog: &TypeCatalog,
        names: &[&str],
    ) -> Result<BTreeMap<String, BeanDefinition>, DefinitionError> {
        DefinitionReader::new(catalog).read(names.iter().copied())
    }

    #[test]
    fn reads_components_and_factory_methods() {
        let catalog = TypeCatalog::new().with(repo()).with(config());
        let definitions = read(
            &catalog,
            &[TypeInfo::of::<Repo>().type_name, TypeInfo::of::<AppConfig>().type_name],
        )
        .unwrap();

        let names: Vec<_> = definitions.keys().cloned().collect();
        assert_eq!(names, vec!["appConfig", "clock", "repo", "tasks"]);

        let config = &definitions["appConfig"];
        assert_eq!(config.order(), 1);
        assert!(matches!(config.strategy(), ConstructionStrategy::Constructor(_)));

        let clock = &definitions["clock"];
        assert!(clock.is_primary());
        assert_eq!(clock.declared(), TypeInfo::of::<Clock>());
        assert_eq!(clock.order(), DEFAULT_ORDER);

        let tasks = &definitions["tasks"];
        assert!(matches!(
            tasks.strategy(),
            ConstructionStrategy::FactoryMethod { owner, .. } if owner == "appConfig"
        ));
        assert!(matches!(tasks.init_hook(), LifecycleHook::Named(name) if name == "start"));
        assert_eq!(tasks.strategy().params().len(), 1);
    }

    #[test]
    fn custom_stereotype_names_the_bean() {
        let catalog = TypeCatalog::new()
            .with(TypeDescriptor::annotation::<Stereotype>().component())
            .with(
                TypeDescriptor::class::<Repo>()
                    .annotate(Annotation::custom::<Stereotype>(Some("users")))
                    .constructor(ConstructorDescriptor::new(|_| Ok(Repo))),
            )
            .with(
                TypeDescriptor::class::<Unnamed>()
                    .annotate(Annotation::custom::<Stereotype>(None))
                    .constructor(ConstructorDescriptor::new(|_| Ok(Unnamed))),
            );

        let definitions = read(&catalog, &[TypeInfo::of::<Repo>().type_name]).unwrap();
        assert!(definitions.contains_key("users"));

        let error = read(&catalog, &[TypeInfo::of::<Unnamed>().type_name]).unwrap_err();
        assert!(matches!(error, DefinitionError::MalformedAnnotation { .. }));
    }

    #[test]
    fn non_component_types_are_skipped() {
        let catalog = TypeCatalog::new()
            .with(TypeDescriptor::class::<Clock>())
            .with(TypeDescriptor::annotation::<Stereotype>().component());
        let definitions = read(
            &catalog,
            &[TypeInfo::of::<Clock>().type_name, TypeInfo::of::<Stereotype>().type_name],
        )
        .unwrap();
        assert!(definitions.is_empty());
    }

    #[test]
    fn constructor_selection() {
        let two_public = TypeDescriptor::class::<Repo>()
            .component()
            .constructor(ConstructorDescriptor::new(|_| Ok(Repo)))
            .constructor(ConstructorDescriptor::new(|_| Ok(Repo)));
        let catalog = TypeCatalog::new().with(two_public);
        assert_eq!(
            read(&catalog, &[TypeInfo::of::<Repo>().type_name]).unwrap_err(),
            DefinitionError::MultipleConstructors {
                type_name: TypeInfo::of::<Repo>().type_name,
                kind: "public"
            }
        );

        let single_private = TypeDescriptor::class::<Repo>().component().constructor(
            ConstructorDescriptor::new(|_| Ok(Repo)).visibility(Visibility::Private),
        );
        let catalog = TypeCatalog::new().with(single_private);
        assert!(read(&catalog, &[TypeInfo::of::<Repo>().type_name]).is_ok());

        let catalog = TypeCatalog::new().with(TypeDescriptor::class::<Repo>().component());
        assert!(matches!(
            read(&catalog, &[TypeInfo::of::<Repo>().type_name]),
            Err(DefinitionError::NoConstructor(_))
        ));
    }

    #[test]
    fn invalid_components_and_factories_are_rejected() {
        let catalog = TypeCatalog::new().with(repo().abstract_class());
        assert!(matches!(
            read(&catalog, &[TypeInfo::of::<Repo>().type_name]),
            Err(DefinitionError::InvalidComponent { reason: "abstract", .. })
        ));

        let unit_factory = TypeDescriptor::class::<AppConfig>()
            .configuration()
            .constructor(ConstructorDescriptor::new(|_| Ok(AppConfig)))
            .method(MethodDescriptor::factory::<AppConfig, (), _>("nothing", |_, _| Ok(())));
        let catalog = TypeCatalog::new().with(unit_factory);
        assert!(matches!(
            read(&catalog, &[TypeInfo::of::<AppConfig>().type_name]),
            Err(DefinitionError::InvalidFactoryMethod { reason: "return void", .. })
        ));

        let primitive_factory = TypeDescriptor::class::<AppConfig>()
            .configuration()
            .constructor(ConstructorDescriptor::new(|_| Ok(AppConfig)))
            .method(MethodDescriptor::factory::<AppConfig, u16, _>("port", |_, _| Ok(8080)));
        let catalog = TypeCatalog::new().with(primitive_factory);
        assert!(matches!(
            read(&catalog, &[TypeInfo::of::<AppConfig>().type_name]),
            Err(DefinitionError::InvalidFactoryMethod { reason: "return a primitive type", .. })
        ));
    }

    #[test]
    fn duplicate_names_across_components_and_factories() {
        let clashing = TypeDescriptor::class::<AppConfig>()
            .configuration()
            .constructor(ConstructorDescriptor::new(|_| Ok(AppConfig)))
            .method(
                MethodDescriptor::factory::<AppConfig, Clock, _>("clock", |_, _| Ok(Clock))
                    .annotate(Annotation::bean_named("repo")),
            );
        let catalog = TypeCatalog::new().with(repo()).with(clashing);
        assert_eq!(
            read(
                &catalog,
                &[TypeInfo::of::<Repo>().type_name, TypeInfo::of::<AppConfig>().type_name]
            )
            .unwrap_err(),
            DefinitionError::DuplicateBeanName("repo".into())
        );
    }

    #[test]
    fn lifecycle_methods_are_validated() {
        let two_inits = repo()
            .method(
                MethodDescriptor::hook::<Repo, _>("open", |_| Ok(()))
                    .annotate(Annotation::PostConstruct),
            )
            .method(
                MethodDescriptor::hook::<Repo, _>("warm", |_| Ok(()))
                    .annotate(Annotation::PostConstruct),
            );
        let catalog = TypeCatalog::new().with(two_inits);
        assert!(matches!(
            read(&catalog, &[TypeInfo::of::<Repo>().type_name]),
            Err(DefinitionError::InvalidLifecycleMethod { annotation: "PostConstruct", .. })
        ));

        let with_destroy = repo().method(
            MethodDescriptor::hook::<Repo, _>("close", |_| Ok(())).annotate(Annotation::PreDestroy),
        );
        let catalog = TypeCatalog::new().with(with_destroy);
        let definitions = read(&catalog, &[TypeInfo::of::<Repo>().type_name]).unwrap();
        assert!(matches!(
            definitions["repo"].destroy_hook(),
            LifecycleHook::Method(method) if method.name == "close"
        ));
    }

    #[test]
    fn unknown_type_names_fail() {
        let catalog = TypeCatalog::new();
        assert_eq!(
            read(&catalog, &["app::Missing"]).unwrap_err(),
            DefinitionError::UnknownType("app::Missing".into())
        );
    }
}
