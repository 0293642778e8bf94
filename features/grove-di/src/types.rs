use std::{
    any::{Any, TypeId},
    fmt::Debug,
    sync::Arc,
};

/// Boxed error used for failures raised by user code (constructors, hooks, sources)
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// A finished container may be read from any number of threads,
/// so anything managed by it needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// A type-erased, shared bean instance
///
/// Cloning an [Instance] is cheap and keeps its identity, see [Instance::ptr_eq].
#[derive(Clone)]
pub struct Instance {
    info: TypeInfo,
    inner: Arc<dyn Any + Send + Sync + 'static>,
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.info.type_name)
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

impl Instance {
    pub fn new<ExistingInstance: Injectable>(instance: ExistingInstance) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    /// Wraps an existing [Arc] without changing its identity
    pub fn from_arc<ExistingInstance: Injectable>(instance: Arc<ExistingInstance>) -> Self {
        Instance {
            info: TypeInfo::of::<ExistingInstance>(),
            inner: instance,
        }
    }

    /// Runtime type of the wrapped value
    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.inner.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }

    pub fn is<T: Injectable>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// True if both handles point to the same object
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Last path segment of the type name, without generic arguments
    ///
    /// `my_app::repo::UserRepo<u32>` becomes `UserRepo`, `dyn my_app::Clock` becomes `Clock`.
    pub fn simple_name(&self) -> &'static str {
        let name = self.type_name.trim_start_matches("dyn ");
        let name = match name.find('<') {
            Some(generics) => &name[..generics],
            None => name,
        };
        match name.rfind("::") {
            Some(separator) => &name[separator + 2..],
            None => name,
        }
    }

    /// Module path of the type, empty for types outside any module
    pub fn module_path(&self) -> &'static str {
        let name = self.type_name.trim_start_matches("dyn ");
        let name = match name.find('<') {
            Some(generics) => &name[..generics],
            None => name,
        };
        match name.rfind("::") {
            Some(separator) => &name[..separator],
            None => "",
        }
    }

    /// Default bean name: the simple name with a lower-cased first character
    pub fn default_bean_name(&self) -> String {
        let simple = self.simple_name();
        let mut chars = simple.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// The unit type, which is what methods without a result return
    pub fn is_unit(&self) -> bool {
        self.type_id == TypeId::of::<()>()
    }

    pub fn is_primitive(&self) -> bool {
        [
            TypeId::of::<bool>(),
            TypeId::of::<char>(),
            TypeId::of::<i8>(),
            TypeId::of::<i16>(),
            TypeId::of::<i32>(),
            TypeId::of::<i64>(),
            TypeId::of::<i128>(),
            TypeId::of::<isize>(),
            TypeId::of::<u8>(),
            TypeId::of::<u16>(),
            TypeId::of::<u32>(),
            TypeId::of::<u64>(),
            TypeId::of::<u128>(),
            TypeId::of::<usize>(),
            TypeId::of::<f32>(),
            TypeId::of::<f64>(),
        ]
        .contains(&self.type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod shop {
        pub struct OrderRepo;
        pub struct Page<T>(pub T);
        pub trait Clock {}
    }

    #[test]
    fn names_are_derived_from_the_rust_path() {
        let info = TypeInfo::of::<shop::OrderRepo>();
        assert_eq!(info.simple_name(), "OrderRepo");
        assert_eq!(info.default_bean_name(), "orderRepo");
        assert!(info.module_path().ends_with("tests::shop"));

        assert_eq!(TypeInfo::of::<shop::Page<u32>>().simple_name(), "Page");
        assert_eq!(TypeInfo::of::<dyn shop::Clock>().simple_name(), "Clock");
    }

    #[test]
    fn scalar_and_unit_detection() {
        assert!(TypeInfo::of::<i32>().is_primitive());
        assert!(TypeInfo::of::<()>().is_unit());
        assert!(!TypeInfo::of::<String>().is_primitive());
    }

    #[test]
    fn instance_identity_survives_clone() {
        let a = Instance::new(String::from("bean"));
        let b = a.clone();
        let c = Instance::new(String::from("bean"));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(*a.downcast::<String>().unwrap(), "bean");
        assert_eq!(a.downcast::<u8>().unwrap_err(), "alloc::string::String");
    }
}
