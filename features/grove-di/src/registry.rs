use std::{collections::BTreeMap, sync::Arc};

use crate::{
    catalog::TypeCatalog,
    definition::BeanDefinition,
    errors::RequireError,
    types::TypeInfo,
};

/// All bean definitions by name, together with the catalog describing their types
#[derive(Debug, Clone)]
pub struct BeanRegistry {
    catalog: Arc<TypeCatalog>,
    definitions: BTreeMap<String, BeanDefinition>,
}

impl BeanRegistry {
    pub fn new(catalog: Arc<TypeCatalog>, definitions: BTreeMap<String, BeanDefinition>) -> Self {
        BeanRegistry {
            catalog,
            definitions,
        }
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn find_definition(&self, name: &str) -> Option<&BeanDefinition> {
        self.definitions.get(name)
    }

    pub(crate) fn find_definition_mut(&mut self, name: &str) -> Option<&mut BeanDefinition> {
        self.definitions.get_mut(name)
    }

    /// Definitions in (order, name) order
    pub fn definitions(&self) -> Vec<&BeanDefinition> {
        let mut definitions: Vec<_> = self.definitions.values().collect();
        definitions.sort_by(|left, right| left.sort_key().cmp(&right.sort_key()));
        definitions
    }

    /// Names of the definitions matching `filter`, in (order, name) order
    pub(crate) fn names_where(&self, filter: impl Fn(&BeanDefinition) -> bool) -> Vec<String> {
        self.definitions()
            .into_iter()
            .filter(|definition| filter(*definition))
            .map(|definition| definition.name().to_string())
            .collect()
    }

    /// All definitions whose declared type is assignable to `ty`, in (order, name) order
    pub fn find_definitions(&self, ty: TypeInfo) -> Vec<&BeanDefinition> {
        self.definitions()
            .into_iter()
            .filter(|definition| self.catalog.is_assignable(ty, definition.declared()))
            .collect()
    }

    /// The unique definition assignable to `ty`, using `@Primary` to break ties
    ///
    /// `Ok(None)` if nothing matches.
    pub fn find_definition_by_type(
        &self,
        ty: TypeInfo,
    ) -> Result<Option<&BeanDefinition>, RequireError> {
        let candidates = self.find_definitions(ty);
        match candidates.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            _ => {
                let primaries: Vec<&BeanDefinition> = candidates
                    .iter()
                    .copied()
                    .filter(|definition| definition.is_primary())
                    .collect();
                match primaries.as_slice() {
                    [primary] => Ok(Some(*primary)),
                    [] => Err(RequireError::NoUniqueBean {
                        type_name: ty.type_name,
                        reason: "but no @Primary specified",
                    }),
                    _ => Err(RequireError::NoUniqueBean {
                        type_name: ty.type_name,
                        reason: "and multiple @Primary specified",
                    }),
                }
            }
        }
    }

    /// The definition named `name`, which must be assignable to `ty`
    ///
    /// `Ok(None)` if there is no such name.
    pub fn find_definition_typed(
        &self,
        name: &str,
        ty: TypeInfo,
    ) -> Result<Option<&BeanDefinition>, RequireError> {
        let Some(definition) = self.find_definition(name) else {
            return Ok(None);
        };
        if !self.catalog.is_assignable(ty, definition.declared()) {
            return Err(RequireError::NotOfRequiredType {
                name: name.to_string(),
                required_type: ty.type_name,
                actual_type: definition.declared().type_name,
            });
        }
        Ok(Some(definition))
    }

    pub(crate) fn clear(&mut self) {
        for definition in self.definitions.values_mut() {
            definition.clear_instance();
        }
        self.definitions.clear();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        catalog::descriptor::{ConstructorDescriptor, TypeDescriptor},
        definition::DEFAULT_ORDER,
    };

    trait Store {}
    struct Disk;
    struct Memory;
    struct Cache;

    fn definition(name: &str, declared: TypeInfo, order: i32, primary: bool) -> BeanDefinition {
        BeanDefinition::constructed(
            name.to_string(),
            declared,
            Arc::new(ConstructorDescriptor::new(|_| Ok(Disk))),
            order,
            primary,
            None,
            None,
        )
    }

    fn registry(disk_primary: bool, memory_primary: bool) -> BeanRegistry {
        let catalog = TypeCatalog::new()
            .with(TypeDescriptor::interface::<dyn Store>())
            .with(TypeDescriptor::class::<Disk>().implements::<dyn Store>())
            .with(TypeDescriptor::class::<Memory>().implements::<dyn Store>())
            .with(TypeDescriptor::class::<Cache>());
        let definitions = [
            definition("disk", TypeInfo::of::<Disk>(), DEFAULT_ORDER, disk_primary),
            definition("memory", TypeInfo::of::<Memory>(), 5, memory_primary),
            definition("cache", TypeInfo::of::<Cache>(), DEFAULT_ORDER, false),
        ]
        .into_iter()
        .map(|definition| (definition.name().to_string(), definition))
        .collect();
        BeanRegistry::new(Arc::new(catalog), definitions)
    }

    #[test]
    fn candidates_are_ordered() {
        let registry = registry(false, false);
        let names: Vec<_> = registry
            .find_definitions(TypeInfo::of::<dyn Store>())
            .into_iter()
            .map(BeanDefinition::name)
            .collect();
        assert_eq!(names, vec!["memory", "disk"]);
    }

    #[test]
    fn primary_breaks_ties() {
        let store = TypeInfo::of::<dyn Store>();

        let with_primary = registry(true, false);
        let found = with_primary.find_definition_by_type(store).unwrap().unwrap();
        assert_eq!(found.name(), "disk");

        assert_eq!(
            registry(false, false).find_definition_by_type(store).unwrap_err(),
            RequireError::NoUniqueBean {
                type_name: store.type_name,
                reason: "but no @Primary specified"
            }
        );
        assert_eq!(
            registry(true, true).find_definition_by_type(store).unwrap_err(),
            RequireError::NoUniqueBean {
                type_name: store.type_name,
                reason: "and multiple @Primary specified"
            }
        );
    }

    #[test]
    fn single_and_missing_matches() {
        let registry = registry(false, false);
        let cache = registry
            .find_definition_by_type(TypeInfo::of::<Cache>())
            .unwrap();
        assert_eq!(cache.map(BeanDefinition::name), Some("cache"));
        assert!(registry
            .find_definition_by_type(TypeInfo::of::<String>())
            .unwrap()
            .is_none());
    }

    #[test]
    fn typed_lookup_checks_assignability() {
        let registry = registry(false, false);
        let store = TypeInfo::of::<dyn Store>();
        assert!(registry.find_definition_typed("disk", store).unwrap().is_some());
        assert!(registry.find_definition_typed("nope", store).unwrap().is_none());
        assert!(matches!(
            registry.find_definition_typed("cache", store),
            Err(RequireError::NotOfRequiredType { .. })
        ));
    }
}
