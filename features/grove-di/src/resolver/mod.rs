use crate::{errors::RequireError, types::Instance};

pub mod arc;

/// Allows custom behaviour when pulling an injected argument out of [Args]
pub trait Resolver: Sized {
    /// Resolve from the injected argument, `None` if nothing was injected
    fn resolve(argument: Option<&Instance>) -> Result<Self, RequireError>;
}

/// Positional arguments injected into a constructor, factory method or setter
///
/// An optional autowired dependency which could not be found is passed as `None`.
#[derive(Debug, Clone, Default)]
pub struct Args(Vec<Option<Instance>>);

impl Args {
    pub fn new(arguments: Vec<Option<Instance>>) -> Self {
        Args(arguments)
    }

    pub fn empty() -> Self {
        Args(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw argument at `index`
    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.0.get(index).and_then(Option::as_ref)
    }

    /// Resolves the argument at `index` into any [Resolver], e.g. `Arc<T>` or `Option<Arc<T>>`
    pub fn resolve<R: Resolver>(&self, index: usize) -> Result<R, RequireError> {
        R::resolve(self.get(index))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn resolves_required_optional_and_values() {
        let args = Args::new(vec![
            Some(Instance::new(7_u16)),
            None,
            Some(Instance::new(String::from("grove"))),
        ]);

        let port: Arc<u16> = args.resolve(0).unwrap();
        assert_eq!(*port, 7);

        let missing: Option<Arc<u16>> = args.resolve(1).unwrap();
        assert!(missing.is_none());

        assert!(matches!(
            args.resolve::<Arc<u16>>(1),
            Err(RequireError::NoSuchBeanOfType("u16"))
        ));
        assert!(matches!(
            args.resolve::<Arc<u16>>(2),
            Err(RequireError::DowncastFailed { .. })
        ));
        assert_eq!(args.value::<String>(2).unwrap(), "grove");
    }
}
