/// Misconfigured proxies, reported while the context starts
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AopError {
    #[error("@{annotation} on bean '{bean}' must have a value naming its handler")]
    MissingValue {
        annotation: &'static str,
        bean: String,
    },
    #[error("@{annotation} proxy handler '{handler}' not found")]
    HandlerNotFound {
        annotation: &'static str,
        handler: String,
    },
    #[error("Proxy handler is not of type {expected}, found {actual}")]
    HandlerNotOfType {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Proxy target is not of type {expected}, found {actual}")]
    TargetNotOfType {
        expected: &'static str,
        actual: &'static str,
    },
}
