/// Errors when resolving or converting a property
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// A required property is not set and has no default
    #[error("Property '{0}' not found")]
    Missing(String),
    /// An expression like `${}` or `${:default}` without a key
    #[error("Invalid key in expression '{0}'")]
    InvalidKey(String),
    /// No converter is registered for the requested type
    #[error("Unsupported value type: {0}")]
    Unsupported(&'static str),
    #[error("Cannot convert '{value}' to {type_name}: {reason}")]
    Conversion {
        value: String,
        type_name: &'static str,
        reason: String,
    },
    /// Values referencing each other without end
    #[error("Property '{0}' is nested too deeply, it probably references itself")]
    TooDeep(String),
}
