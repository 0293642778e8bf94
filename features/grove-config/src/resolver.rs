use std::{any::type_name, collections::HashMap};

use grove_di::{DynError, Injectable, Instance, PropertySource, TypeInfo};

use crate::{convert::Converters, errors::PropertyError, expr::PropertyExpr};

/// How often a value may lead to another expression before giving up
const MAX_DEPTH: usize = 32;

/// Key value properties with `${key:default}` expressions and typed conversion
///
/// Values may themselves be expressions, they are resolved recursively on lookup.
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    properties: HashMap<String, String>,
    converters: Converters,
}
impl Default for PropertyResolver {
    fn default() -> Self {
        Self::new(std::iter::empty::<(String, String)>())
    }
}

impl PropertyResolver {
    /// Resolver over exactly the given properties
    pub fn new<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let resolver = PropertyResolver {
            properties: properties
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            converters: Converters::default(),
        };
        resolver.log_properties();
        resolver
    }

    /// Resolver over the process environment, with the given properties taking precedence
    ///
    /// Environment variables that are not valid unicode are left out.
    pub fn with_env<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut merged: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        merged.extend(
            properties
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        Self::new(merged)
    }

    fn log_properties(&self) {
        let mut keys: Vec<&String> = self.properties.keys().collect();
        keys.sort();
        for key in keys {
            tracing::debug!("Property {key} = {}", self.properties[key]);
        }
    }
}

impl PropertyResolver {
    /// Sets a property, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Same as [PropertyResolver::set] if `value` is `Some`, does nothing otherwise
    pub fn maybe_set(
        &mut self,
        key: impl Into<String>,
        value: Option<impl Into<String>>,
    ) -> &mut Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Register converters for additional types here
    pub fn converters_mut(&mut self) -> &mut Converters {
        &mut self.converters
    }

    /// Whether the plain key is set, expressions are not evaluated
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// The resolved value of a plain key or an expression
    ///
    /// `${key}` fails with [PropertyError::Missing] if `key` is not set,
    /// `${key:default}` falls back to `default`.
    pub fn get_property(&self, key: &str) -> Result<Option<String>, PropertyError> {
        self.lookup(key, 0)
    }

    /// The resolved value of `key`, or the resolved `default`
    pub fn get_property_or(&self, key: &str, default: &str) -> Result<String, PropertyError> {
        self.lookup_or(key, default, 0)
    }

    pub fn get_required_property(&self, key: &str) -> Result<String, PropertyError> {
        self.get_property(key)?
            .ok_or_else(|| PropertyError::Missing(key.to_string()))
    }

    /// Converts raw text into a value of type `ty`
    pub fn convert(&self, ty: TypeInfo, value: &str) -> Result<Instance, PropertyError> {
        self.converters.convert(ty, value)
    }

    /// [PropertyResolver::get_property] converted to `T`
    pub fn get_as<T: Injectable + Clone>(&self, key: &str) -> Result<Option<T>, PropertyError> {
        self.get_property(key)?
            .map(|value| self.convert_to::<T>(&value))
            .transpose()
    }

    pub fn get_as_or<T: Injectable + Clone>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, PropertyError> {
        Ok(self.get_as::<T>(key)?.unwrap_or(default))
    }

    pub fn get_required_as<T: Injectable + Clone>(&self, key: &str) -> Result<T, PropertyError> {
        self.get_as::<T>(key)?
            .ok_or_else(|| PropertyError::Missing(key.to_string()))
    }

    fn convert_to<T: Injectable + Clone>(&self, value: &str) -> Result<T, PropertyError> {
        let instance = self.convert(TypeInfo::of::<T>(), value)?;
        let converted = instance
            .downcast::<T>()
            .map_err(|actual| PropertyError::Conversion {
                value: value.to_string(),
                type_name: type_name::<T>(),
                reason: format!("converter produced {actual}"),
            })?;
        Ok(T::clone(&converted))
    }

    fn lookup(&self, key: &str, depth: usize) -> Result<Option<String>, PropertyError> {
        if depth > MAX_DEPTH {
            return Err(PropertyError::TooDeep(key.to_string()));
        }
        if let Some(expr) = PropertyExpr::parse(key)? {
            return self.resolve_expr(expr, depth).map(Some);
        }
        self.properties
            .get(key)
            .map(|value| self.resolve_value(value, depth + 1))
            .transpose()
    }

    fn lookup_or(&self, key: &str, default: &str, depth: usize) -> Result<String, PropertyError> {
        match self.lookup(key, depth)? {
            Some(value) => Ok(value),
            None => self.resolve_value(default, depth + 1),
        }
    }

    fn resolve_expr(&self, expr: PropertyExpr<'_>, depth: usize) -> Result<String, PropertyError> {
        match expr.default {
            Some(default) => self.lookup_or(expr.key, default, depth + 1),
            None => self
                .lookup(expr.key, depth + 1)?
                .ok_or_else(|| PropertyError::Missing(expr.key.to_string())),
        }
    }

    fn resolve_value(&self, value: &str, depth: usize) -> Result<String, PropertyError> {
        match PropertyExpr::parse(value)? {
            Some(expr) => self.resolve_expr(expr, depth),
            None => Ok(value.to_string()),
        }
    }
}

impl PropertySource for PropertyResolver {
    fn get(
        &self,
        key: &str,
        ty: TypeInfo,
        default: Option<&str>,
    ) -> Result<Option<Instance>, DynError> {
        let value = match default {
            Some(default) => Some(self.get_property_or(key, default)?),
            None => self.get_property(key)?,
        };
        Ok(value
            .map(|value| self.convert(ty, &value))
            .transpose()?)
    }
}
