#![allow(dead_code)]

use std::collections::HashMap;

use grove_di::{DynError, Injectable, Instance, PropertySource, TypeInfo};

/// Properties holding ready made values under plain keys
#[derive(Default)]
pub struct MapProperties(HashMap<String, Instance>);

impl MapProperties {
    pub fn with<T: Injectable>(mut self, key: &str, value: T) -> Self {
        self.0.insert(key.to_string(), Instance::new(value));
        self
    }
}

impl PropertySource for MapProperties {
    fn get(
        &self,
        key: &str,
        ty: TypeInfo,
        _default: Option<&str>,
    ) -> Result<Option<Instance>, DynError> {
        match self.0.get(key) {
            Some(value) if value.info() == ty => Ok(Some(value.clone())),
            Some(value) => {
                Err(format!("'{key}' holds {} but {ty} was requested", value.info()).into())
            }
            None => Ok(None),
        }
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
