//! Grove Config resolves the `@Value` properties injected by Grove DI.
//!
//! Grove Config is split into three major parts:
//! 1. PropertyResolver: holds the properties and resolves `${key:default}` expressions
//! 2. Converters: turn property text into typed values
//! 3. PropertyExpr: parses a single expression
//!
//! # Examples
//!
//! ```rust
//! use grove_config::PropertyResolver;
//!
//! let resolver = PropertyResolver::new([
//!     ("server.host", "localhost"),
//!     ("server.port", "8080"),
//!     ("server.url", "${server.host}"),
//! ]);
//!
//! assert_eq!(resolver.get_property("server.url").unwrap().as_deref(), Some("localhost"));
//! assert_eq!(resolver.get_as::<u16>("server.port").unwrap(), Some(8080));
//! assert_eq!(resolver.get_property("${server.threads:4}").unwrap().as_deref(), Some("4"));
//! assert!(resolver.get_property("${server.threads}").is_err());
//! ```
//!
//! The resolver is a [grove_di::PropertySource], hand it to
//! [grove_di::ContextBuilder::properties] to inject its values into beans.

pub mod convert;
pub mod errors;
pub mod expr;
pub mod resolver;

pub use convert::Converters;
pub use errors::PropertyError;
pub use expr::PropertyExpr;
pub use resolver::PropertyResolver;
