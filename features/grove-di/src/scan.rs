use std::collections::BTreeSet;

use crate::{
    catalog::{
        annotation::{Annotation, AnnotationKind},
        TypeCatalog,
    },
    errors::{ContextError, DefinitionError},
    types::{DynError, TypeInfo},
};

/// Lists the fully qualified type names found in a package
pub trait ComponentScanner {
    fn scan(&self, package: &str) -> Result<Vec<String>, DynError>;
}

/// Scans the types registered in the catalog itself
impl ComponentScanner for TypeCatalog {
    fn scan(&self, package: &str) -> Result<Vec<String>, DynError> {
        Ok(self
            .type_names_in(package)
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}

/// All type names to read definitions from, starting at the configuration type
///
/// Scans the packages named by `@ComponentScan` on `config_type`, or its own module if none
/// are given, then adds the `@Import`ed types.
pub fn scan_for_type_names(
    config_type: TypeInfo,
    catalog: &TypeCatalog,
    scanner: &dyn ComponentScanner,
) -> Result<BTreeSet<String>, ContextError> {
    let descriptor = catalog
        .describe(config_type)
        .ok_or_else(|| DefinitionError::UnknownType(config_type.type_name.to_string()))?;
    let target = config_type.simple_name();

    let packages = match catalog.find_annotation(
        &descriptor.annotations,
        target,
        AnnotationKind::ComponentScan,
    )? {
        Some(Annotation::ComponentScan(packages)) if !packages.is_empty() => packages,
        _ => vec![config_type.module_path().to_string()],
    };

    let mut type_names = BTreeSet::new();
    for package in packages {
        tracing::info!("Component scan in package: {package}");
        let found = scanner
            .scan(&package)
            .map_err(|source| ContextError::Scan {
                package: package.clone(),
                source,
            })?;
        type_names.extend(found);
    }

    if let Some(Annotation::Import(imports)) =
        catalog.find_annotation(&descriptor.annotations, target, AnnotationKind::Import)?
    {
        for import in imports {
            if !type_names.insert(import.type_name.to_string()) {
                tracing::warn!(
                    "Ignoring import {import}, it has already been scanned"
                );
            }
        }
    }

    Ok(type_names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::descriptor::TypeDescriptor;

    mod app {
        pub struct AppConfig;
        pub struct Repo;
        pub mod web {
            pub struct Controller;
        }
    }
    mod external {
        pub struct Metrics;
    }

    fn catalog(config: TypeDescriptor) -> TypeCatalog {
        TypeCatalog::new()
            .with(config)
            .with(TypeDescriptor::class::<app::Repo>())
            .with(TypeDescriptor::class::<app::web::Controller>())
            .with(TypeDescriptor::class::<external::Metrics>())
    }

    #[test]
    fn scans_own_module_and_imports() {
        let config = TypeDescriptor::class::<app::AppConfig>()
            .configuration()
            .annotate(Annotation::Import(vec![
                TypeInfo::of::<external::Metrics>(),
                TypeInfo::of::<app::Repo>(),
            ]));
        let catalog = catalog(config);

        let names =
            scan_for_type_names(TypeInfo::of::<app::AppConfig>(), &catalog, &catalog).unwrap();
        assert_eq!(names.len(), 4);
        assert!(names.contains(TypeInfo::of::<app::web::Controller>().type_name));
        assert!(names.contains(TypeInfo::of::<external::Metrics>().type_name));
    }

    #[test]
    fn explicit_packages_replace_the_default() {
        let web = TypeInfo::of::<app::web::Controller>().module_path().to_string();
        let config = TypeDescriptor::class::<app::AppConfig>()
            .configuration()
            .annotate(Annotation::ComponentScan(vec![web]));
        let catalog = catalog(config);

        let names =
            scan_for_type_names(TypeInfo::of::<app::AppConfig>(), &catalog, &catalog).unwrap();
        let names: Vec<_> = names.into_iter().collect();
        assert_eq!(names, vec![TypeInfo::of::<app::web::Controller>().type_name.to_string()]);
    }

    #[test]
    fn scanner_failures_name_the_package() {
        struct Broken;
        impl ComponentScanner for Broken {
            fn scan(&self, _package: &str) -> Result<Vec<String>, DynError> {
                Err("disk on fire".into())
            }
        }
        let catalog = catalog(TypeDescriptor::class::<app::AppConfig>().configuration());
        let error =
            scan_for_type_names(TypeInfo::of::<app::AppConfig>(), &catalog, &Broken).unwrap_err();
        assert!(matches!(error, ContextError::Scan { .. }));
    }
}
