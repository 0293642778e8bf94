//! Type catalog: the capability query layer standing in for runtime reflection.
//!
//! Every type the container should know about is described once with a [TypeDescriptor]
//! (its kind, markers, constructors, methods and fields) and registered in a [TypeCatalog].
//! The container never inspects values directly, it only asks the catalog questions like
//! "is this type assignable to that one" or "does this type carry `@Component`, possibly
//! through one of its annotations".

use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{errors::DefinitionError, types::TypeInfo};

pub mod annotation;
pub mod descriptor;

use annotation::{Annotation, AnnotationKind};
use descriptor::TypeDescriptor;

/// Registry of all described types
#[derive(Debug, Default, Clone)]
pub struct TypeCatalog {
    by_name: HashMap<&'static str, Arc<TypeDescriptor>>,
    by_id: HashMap<TypeId, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor, replacing an earlier one for the same type
    pub fn register(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        let descriptor = Arc::new(descriptor);
        tracing::trace!("Registering type {}", descriptor.info);
        self.by_name
            .insert(descriptor.info.type_name, descriptor.clone());
        self.by_id.insert(descriptor.info.type_id, descriptor);
        self
    }

    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.by_name.get(type_name)
    }

    pub fn get_by_id(&self, type_id: TypeId) -> Option<&Arc<TypeDescriptor>> {
        self.by_id.get(&type_id)
    }

    pub fn describe(&self, info: TypeInfo) -> Option<&Arc<TypeDescriptor>> {
        self.get_by_id(info.type_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Names of all registered types, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .by_id
            .values()
            .map(|descriptor| descriptor.info.type_name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Names of all types declared in `module_path` or any of its sub modules, sorted
    pub fn type_names_in(&self, module_path: &str) -> Vec<&'static str> {
        let nested = format!("{module_path}::");
        let mut names: Vec<_> = self
            .by_id
            .values()
            .filter(|descriptor| {
                let module = descriptor.info.module_path();
                module == module_path || module.starts_with(&nested)
            })
            .map(|descriptor| descriptor.info.type_name)
            .collect();
        names.sort_unstable();
        names
    }

    /// True if a value declared as `source` can be used where `target` is expected
    ///
    /// Walks the superclass and interfaces of `source` as far as they are described.
    pub fn is_assignable(&self, target: TypeInfo, source: TypeInfo) -> bool {
        let mut pending = vec![source];
        let mut seen = HashSet::new();
        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current.type_id) {
                continue;
            }
            if let Some(descriptor) = self.describe(current) {
                pending.extend(descriptor.superclass);
                pending.extend(descriptor.interfaces.iter().copied());
            }
        }
        false
    }

    /// Finds the annotation of `kind` on a target, directly or through meta annotations
    ///
    /// Annotation types carrying the marker (e.g. a custom annotation that is itself
    /// `@Component`) are followed recursively. Finding the marker on more than one path
    /// is an error. `@Configuration` counts as carrying `@Component`.
    pub fn find_annotation(
        &self,
        annotations: &[Annotation],
        target: &str,
        kind: AnnotationKind,
    ) -> Result<Option<Annotation>, DefinitionError> {
        let mut visiting = HashSet::new();
        self.find_annotation_in(annotations, target, kind, &mut visiting)
    }

    fn find_annotation_in(
        &self,
        annotations: &[Annotation],
        target: &str,
        kind: AnnotationKind,
        visiting: &mut HashSet<TypeId>,
    ) -> Result<Option<Annotation>, DefinitionError> {
        let mut found = annotation::find(annotations, kind).cloned();

        for annotation in annotations {
            let Some((meta_target, meta)) = self.meta_annotations(annotation) else {
                continue;
            };
            if !visiting.insert(meta_target.type_id) {
                continue;
            }
            let inherited =
                self.find_annotation_in(&meta, meta_target.simple_name(), kind, visiting);
            visiting.remove(&meta_target.type_id);

            if let Some(inherited) = inherited? {
                if found.is_some() {
                    return Err(DefinitionError::DuplicateAnnotation {
                        annotation: kind.name(),
                        target: target.to_string(),
                    });
                }
                found = Some(inherited);
            }
        }

        Ok(found)
    }

    /// Annotations carried by the annotation type behind `annotation`
    fn meta_annotations(&self, annotation: &Annotation) -> Option<(TypeInfo, Vec<Annotation>)> {
        match annotation {
            Annotation::Configuration(_) => Some((
                TypeInfo::of::<ConfigurationMarker>(),
                vec![Annotation::Component(None)],
            )),
            Annotation::Custom { annotation, .. } => self
                .describe(*annotation)
                .map(|descriptor| (*annotation, descriptor.annotations.clone())),
            _ => None,
        }
    }

    /// The annotation on `annotations` that carries `kind`, directly or as a meta annotation
    ///
    /// Used to read attributes of the annotation that was written on the target,
    /// e.g. the bean name of a custom `@Component` stereotype.
    pub fn carrier_of<'a>(
        &self,
        annotations: &'a [Annotation],
        target: &str,
        kind: AnnotationKind,
    ) -> Result<Option<&'a Annotation>, DefinitionError> {
        if let Some(direct) = annotation::find(annotations, kind) {
            return Ok(Some(direct));
        }
        for candidate in annotations {
            let Some((meta_target, meta)) = self.meta_annotations(candidate) else {
                continue;
            };
            if self
                .find_annotation(&meta, meta_target.simple_name(), kind)?
                .is_some()
            {
                return Ok(Some(candidate));
            }
        }
        tracing::trace!("No @{} carrier on {target}", kind.name());
        Ok(None)
    }
}

/// Stands in for the annotation type of `@Configuration` during meta annotation lookup
struct ConfigurationMarker;
