use crate::types::{DynError, Instance, TypeInfo};

/// Resolves `@Value` keys to typed values
///
/// Keys may be plain (`app.port`) or expressions like `${app.port:8080}`, it is up to the
/// source to interpret them. The returned instance must be of type `ty`.
pub trait PropertySource: Send + Sync {
    /// `Ok(None)` if the key is not set and there is no default
    fn get(
        &self,
        key: &str,
        ty: TypeInfo,
        default: Option<&str>,
    ) -> Result<Option<Instance>, DynError>;

    fn get_required(&self, key: &str, ty: TypeInfo) -> Result<Instance, DynError> {
        self.get(key, ty, None)?
            .ok_or_else(|| format!("Property '{key}' not found").into())
    }
}

/// A source without any property
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProperties;

impl PropertySource for NoProperties {
    fn get(
        &self,
        key: &str,
        _ty: TypeInfo,
        default: Option<&str>,
    ) -> Result<Option<Instance>, DynError> {
        match default {
            Some(_) => Err(
                format!("Cannot convert default of '{key}' without a property source").into(),
            ),
            None => Ok(None),
        }
    }
}
