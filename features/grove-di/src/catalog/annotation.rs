use crate::types::TypeInfo;

/// Declarative markers attached to types, methods, fields and parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Directly instantiable bean, with an optional explicit bean name
    Component(Option<String>),
    /// Bean source carrying factory methods, implies [Annotation::Component]
    Configuration(Option<String>),
    /// Factory method producing a bean
    Bean {
        name: Option<String>,
        init_method: Option<String>,
        destroy_method: Option<String>,
    },
    Order(i32),
    Primary,
    /// Property key, may use the `${key:default}` syntax
    Value(String),
    /// Dependency resolved by type, optionally narrowed by bean name
    Autowired {
        required: bool,
        name: Option<String>,
    },
    PostConstruct,
    PreDestroy,
    /// Module paths to scan, empty for the module of the annotated type
    ComponentScan(Vec<String>),
    /// Extra types to add on top of the scanned ones
    Import(Vec<TypeInfo>),
    /// A user annotation type registered in the catalog, which may itself carry markers
    ///
    /// `value: None` means the annotation type has no `value` attribute at all.
    Custom {
        annotation: TypeInfo,
        value: Option<String>,
    },
}

/// The kind of an [Annotation], without its attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Component,
    Configuration,
    Bean,
    Order,
    Primary,
    Value,
    Autowired,
    PostConstruct,
    PreDestroy,
    ComponentScan,
    Import,
    Custom(TypeInfo),
}

impl AnnotationKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Component => "Component",
            AnnotationKind::Configuration => "Configuration",
            AnnotationKind::Bean => "Bean",
            AnnotationKind::Order => "Order",
            AnnotationKind::Primary => "Primary",
            AnnotationKind::Value => "Value",
            AnnotationKind::Autowired => "Autowired",
            AnnotationKind::PostConstruct => "PostConstruct",
            AnnotationKind::PreDestroy => "PreDestroy",
            AnnotationKind::ComponentScan => "ComponentScan",
            AnnotationKind::Import => "Import",
            AnnotationKind::Custom(info) => info.simple_name(),
        }
    }
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Component(_) => AnnotationKind::Component,
            Annotation::Configuration(_) => AnnotationKind::Configuration,
            Annotation::Bean { .. } => AnnotationKind::Bean,
            Annotation::Order(_) => AnnotationKind::Order,
            Annotation::Primary => AnnotationKind::Primary,
            Annotation::Value(_) => AnnotationKind::Value,
            Annotation::Autowired { .. } => AnnotationKind::Autowired,
            Annotation::PostConstruct => AnnotationKind::PostConstruct,
            Annotation::PreDestroy => AnnotationKind::PreDestroy,
            Annotation::ComponentScan(_) => AnnotationKind::ComponentScan,
            Annotation::Import(_) => AnnotationKind::Import,
            Annotation::Custom { annotation, .. } => AnnotationKind::Custom(*annotation),
        }
    }

    pub fn bean() -> Self {
        Annotation::Bean {
            name: None,
            init_method: None,
            destroy_method: None,
        }
    }

    pub fn bean_named(name: impl Into<String>) -> Self {
        Annotation::Bean {
            name: Some(name.into()),
            init_method: None,
            destroy_method: None,
        }
    }

    pub fn autowired() -> Self {
        Annotation::Autowired {
            required: true,
            name: None,
        }
    }

    pub fn autowired_optional() -> Self {
        Annotation::Autowired {
            required: false,
            name: None,
        }
    }

    pub fn autowired_named(name: impl Into<String>) -> Self {
        Annotation::Autowired {
            required: true,
            name: Some(name.into()),
        }
    }

    pub fn value(key: impl Into<String>) -> Self {
        Annotation::Value(key.into())
    }

    pub fn custom<A: ?Sized + 'static>(value: Option<&str>) -> Self {
        Annotation::Custom {
            annotation: TypeInfo::of::<A>(),
            value: value.map(str::to_string),
        }
    }
}

/// Finds the annotation of the given kind
pub(crate) fn find(annotations: &[Annotation], kind: AnnotationKind) -> Option<&Annotation> {
    annotations.iter().find(|annotation| annotation.kind() == kind)
}

pub(crate) fn has(annotations: &[Annotation], kind: AnnotationKind) -> bool {
    find(annotations, kind).is_some()
}
