use thiserror::Error;

use crate::types::DynError;

/// Errors raised while turning discovered types into bean definitions
///
/// All of these are detected before any bean is instantiated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Duplicate bean name: {0}")]
    DuplicateBeanName(String),
    #[error("Type '{0}' is not registered in the type catalog")]
    UnknownType(String),
    #[error("No constructor found in class {0}")]
    NoConstructor(&'static str),
    #[error("More than one {kind} constructor found in class {type_name}")]
    MultipleConstructors {
        type_name: &'static str,
        kind: &'static str,
    },
    #[error("@Component class {type_name} must not be {reason}")]
    InvalidComponent {
        type_name: &'static str,
        reason: &'static str,
    },
    #[error("@Bean method {type_name}.{method} must not {reason}")]
    InvalidFactoryMethod {
        type_name: &'static str,
        method: String,
        reason: &'static str,
    },
    #[error("Duplicate @{annotation} found on {target}")]
    DuplicateAnnotation {
        annotation: &'static str,
        target: String,
    },
    #[error("Annotation @{annotation} on {target} is malformed: {reason}")]
    MalformedAnnotation {
        annotation: String,
        target: String,
        reason: &'static str,
    },
    #[error("Cannot inject {member} of {type_name}: {reason}")]
    InvalidInjectionPoint {
        type_name: &'static str,
        member: String,
        reason: &'static str,
    },
    #[error("Lifecycle method '{method}' with @{annotation} in class {type_name}: {reason}")]
    InvalidLifecycleMethod {
        type_name: &'static str,
        method: String,
        annotation: &'static str,
        reason: &'static str,
    },
    #[error("Method '{method}' not found in class {type_name}")]
    MethodNotFound {
        type_name: &'static str,
        method: String,
    },
}

/// Errors when trying to look a bean up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequireError {
    #[error("No bean defined with name '{0}'")]
    NoSuchBeanNamed(String),
    #[error("No bean defined with type '{0}'")]
    NoSuchBeanOfType(&'static str),
    #[error("Autowire required type '{required_type}' but bean '{name}' has actual type '{actual_type}'")]
    NotOfRequiredType {
        name: String,
        required_type: &'static str,
        actual_type: &'static str,
    },
    #[error("Multiple beans with type '{type_name}' found, {reason}")]
    NoUniqueBean {
        type_name: &'static str,
        reason: &'static str,
    },
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Errors in the dependency structure between beans
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("Circular dependency detected when creating bean '{bean}' ({type_name})")]
    CircularDependency {
        bean: String,
        type_name: &'static str,
    },
    #[error("Unsatisfied dependency of type '{dependency}' when {site} for bean '{bean}' ({type_name})")]
    Unsatisfied {
        bean: String,
        type_name: &'static str,
        dependency: &'static str,
        site: String,
    },
}

/// Any failure of the container
///
/// Start-up aborts on the first one encountered; none of them are retried.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Require(#[from] RequireError),
    #[error(transparent)]
    Dependency(#[from] DependencyError),
    /// Constructing, wiring or post processing a bean failed
    #[error("Error creating bean '{bean}' ({type_name}): {message}")]
    BeanCreation {
        bean: String,
        type_name: &'static str,
        message: String,
        #[source]
        source: Option<DynError>,
    },
    /// The component scanner failed for a package
    #[error("Cannot scan package '{package}'")]
    Scan {
        package: String,
        #[source]
        source: DynError,
    },
    /// The property source could not provide a value
    #[error("Cannot resolve property '{key}'")]
    Property {
        key: String,
        #[source]
        source: DynError,
    },
}

impl ContextError {
    pub(crate) fn creation(
        bean: &str,
        type_name: &'static str,
        message: impl Into<String>,
    ) -> Self {
        ContextError::BeanCreation {
            bean: bean.to_string(),
            type_name,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn creation_caused(
        bean: &str,
        type_name: &'static str,
        message: impl Into<String>,
        source: DynError,
    ) -> Self {
        ContextError::BeanCreation {
            bean: bean.to_string(),
            type_name,
            message: message.into(),
            source: Some(source),
        }
    }
}
