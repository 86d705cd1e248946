//! Definition loading for Delve.
//!
//! Definition files describe entity classes and component properties as
//! markup. This crate reads that markup into a generic [`Element`] tree,
//! strips content tagged for the other side of the client/server split, and
//! routes each top-level element to the handler registered for its name.
//! Elements whose handler has not been registered yet are buffered and
//! replayed once it is.

/// Reflection-free property binding from elements onto typed values.
pub mod binding;
/// Diagnostics for malformed markup, rendered with ariadne.
pub mod diagnostics;
/// The generic definition tree.
pub mod element;
/// Error types used throughout the crate.
pub mod error;
/// Markup lexer.
pub mod lexer;
/// File and directory loading.
pub mod loader;
/// Client/server namespace filtering.
pub mod namespace;
/// Markup parser producing [`Element`] trees.
pub mod parser;
/// The type-name dispatch registry.
pub mod registry;

/// Re-export binding types.
pub use binding::{BindMode, BindReport, Definable, Property, PropertyError, bind_properties, parse_property};
/// Re-export diagnostics.
pub use diagnostics::{Diagnostic, Severity};
/// Re-export tree types.
pub use element::{Attribute, Element, Name};
/// Re-export error types.
pub use error::{DefError, DefResult};
/// Re-export namespace filter types.
pub use namespace::{CLIENT_NAMESPACE, DefinitionsNamespace, SERVER_NAMESPACE};
/// Re-export the registry.
pub use registry::{Definitions, Handler, Registrations};
