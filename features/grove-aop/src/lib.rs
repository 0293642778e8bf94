//! Grove AOP substitutes annotated beans with proxies built by a [ProxyFactory].
//!
//! Declare an annotation type, mark beans with it and name a handler bean as its value,
//! then register an [AnnotationProxyPostProcessor] for that annotation. [Around] is the
//! annotation provided out of the box, see [AroundProxyPostProcessor].
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use grove_aop::{Around, AroundProxyPostProcessor, TypedProxyFactory};
//! use grove_di::{
//!     catalog::descriptor::{ConstructorDescriptor, TypeDescriptor},
//!     ContextBuilder,
//! };
//!
//! enum Greeter {
//!     Plain,
//!     Loud(Arc<Greeter>),
//! }
//! impl Greeter {
//!     fn greet(&self) -> String {
//!         match self {
//!             Greeter::Plain => "hello".to_string(),
//!             Greeter::Loud(target) => target.greet().to_uppercase(),
//!         }
//!     }
//! }
//! struct Shouting;
//!
//! let context = ContextBuilder::new()
//!     .describe(
//!         TypeDescriptor::class::<Greeter>()
//!             .component()
//!             .annotate(Around::handler("shouting"))
//!             .constructor(ConstructorDescriptor::new(|_| Ok(Greeter::Plain))),
//!     )
//!     .describe(
//!         TypeDescriptor::class::<Shouting>()
//!             .component()
//!             .constructor(ConstructorDescriptor::new(|_| Ok(Shouting))),
//!     )
//!     .describe(AroundProxyPostProcessor::descriptor(
//!         "aroundProxy",
//!         TypedProxyFactory::new(|target: Arc<Greeter>, _: Arc<Shouting>| Greeter::Loud(target)),
//!     ))
//!     .build_all()
//!     .unwrap();
//!
//! assert_eq!(context.get_bean_of::<Greeter>().unwrap().greet(), "HELLO");
//! ```

use grove_di::catalog::annotation::Annotation;

pub mod errors;
pub mod processor;
pub mod proxy;

pub use errors::AopError;
pub use processor::AnnotationProxyPostProcessor;
pub use proxy::{ProxyFactory, TypedProxyFactory};

/// Annotation wrapping a bean with the handler bean named in its value
pub struct Around;

impl Around {
    /// `@Around(handler)`
    pub fn handler(handler: &str) -> Annotation {
        Annotation::custom::<Around>(Some(handler))
    }
}

pub type AroundProxyPostProcessor = AnnotationProxyPostProcessor<Around>;
