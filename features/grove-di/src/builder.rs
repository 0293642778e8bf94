use std::sync::Arc;

use crate::{
    catalog::{descriptor::TypeDescriptor, TypeCatalog},
    container::ApplicationContext,
    errors::ContextError,
    property::{NoProperties, PropertySource},
    scan::ComponentScanner,
    types::TypeInfo,
};

/// Collects everything needed to start an [ApplicationContext]
///
/// Types are described up front, then either scanned from a configuration type
/// or listed explicitly.
pub struct ContextBuilder {
    catalog: TypeCatalog,
    properties: Arc<dyn PropertySource>,
    scanner: Option<Box<dyn ComponentScanner>>,
}
impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        ContextBuilder {
            catalog: TypeCatalog::new(),
            properties: Arc::new(NoProperties),
            scanner: None,
        }
    }

    pub fn with_catalog(catalog: TypeCatalog) -> Self {
        ContextBuilder {
            catalog,
            ..Self::new()
        }
    }
}
impl ContextBuilder {
    pub fn describe(mut self, descriptor: TypeDescriptor) -> Self {
        self.catalog.register(descriptor);
        self
    }

    pub fn properties<P: PropertySource + 'static>(mut self, properties: P) -> Self {
        self.properties = Arc::new(properties);
        self
    }

    pub fn shared_properties(mut self, properties: Arc<dyn PropertySource>) -> Self {
        self.properties = properties;
        self
    }

    /// Replaces the default scanner, which lists the described types
    pub fn scanner<S: ComponentScanner + 'static>(mut self, scanner: S) -> Self {
        self.scanner = Some(Box::new(scanner));
        self
    }

    /// Starts the context from the configuration type `C`
    pub fn scan<C: ?Sized + 'static>(self) -> Result<ApplicationContext, ContextError> {
        let config_type = TypeInfo::of::<C>();
        let ContextBuilder {
            catalog,
            properties,
            scanner,
        } = self;
        match scanner {
            Some(scanner) => {
                ApplicationContext::new(config_type, catalog, properties, scanner.as_ref())
            }
            None => {
                let scanner = catalog.clone();
                ApplicationContext::new(config_type, catalog, properties, &scanner)
            }
        }
    }

    /// Starts the context from an explicit list of type names
    pub fn build<I, S>(self, type_names: I) -> Result<ApplicationContext, ContextError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ApplicationContext::from_type_names(type_names, self.catalog, self.properties)
    }

    /// Starts the context from all described types
    pub fn build_all(self) -> Result<ApplicationContext, ContextError> {
        let type_names = self.catalog.type_names();
        self.build(type_names)
    }
}
