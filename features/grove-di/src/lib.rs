//! Grove DI is a dependency injection container for singleton beans.
//!
//! It is split into three major parts:
//! 1. The [catalog](catalog::TypeCatalog): describes types, their markers, constructors,
//!    factory methods and injection points
//! 2. The [definition reader](definition::reader::DefinitionReader): turns described
//!    components into bean definitions
//! 3. The [ApplicationContext]: creates all beans in stages, wires them, runs their
//!    lifecycle callbacks and applies [BeanPostProcessor]s
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use grove_di::{
//!     catalog::descriptor::{ConstructorDescriptor, ParamDescriptor, TypeDescriptor},
//!     ContextBuilder,
//! };
//!
//! struct Repo;
//! struct Service {
//!     repo: Arc<Repo>,
//! }
//!
//! let context = ContextBuilder::new()
//!     .describe(
//!         TypeDescriptor::class::<Repo>()
//!             .component()
//!             .constructor(ConstructorDescriptor::new(|_| Ok(Repo))),
//!     )
//!     .describe(
//!         TypeDescriptor::class::<Service>().component().constructor(
//!             ConstructorDescriptor::new(|args| {
//!                 Ok(Service {
//!                     repo: args.bean::<Repo>(0)?,
//!                 })
//!             })
//!             .param(ParamDescriptor::autowired::<Repo>("repo")),
//!         ),
//!     )
//!     .build_all()
//!     .unwrap();
//!
//! let service = context.get_bean_of::<Service>().unwrap();
//! let repo = context.get_bean_of::<Repo>().unwrap();
//! assert!(Arc::ptr_eq(&service.repo, &repo));
//! ```

pub mod catalog;
pub mod definition;
pub mod errors;
pub mod processor;
pub mod property;
pub mod registry;
pub mod resolver;
pub mod scan;
pub mod types;

mod builder;
mod container;
mod initiator;

pub use builder::ContextBuilder;
pub use container::ApplicationContext;
pub use errors::{ContextError, DefinitionError, DependencyError, RequireError};
pub use initiator::CreationContext;
pub use processor::{BeanPostProcessor, PostProcessorChain};
pub use property::{NoProperties, PropertySource};
pub use resolver::{Args, Resolver};
pub use scan::ComponentScanner;
pub use types::{DynError, Injectable, Instance, TypeInfo};
