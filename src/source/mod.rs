//! Document source resolution

pub mod resolver;

pub use resolver::{resolve_default, resolve_path, DocumentSource, ResolvedPdf, SourceId};
