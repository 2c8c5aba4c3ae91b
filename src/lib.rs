//! Resource Metadata Description Library
//!
//! This library gathers RDF metadata about research resources (projects,
//! registrations, files, users) and serializes the gathered graph into
//! citation and interchange formats.
//!
//! # Overview
//!
//! Description happens in two phases:
//!
//! 1. A bounded breadth-first walk visits the seed resource and, up to a
//!    configurable visit budget, same-domain resources it references. Every
//!    visit runs a catalogue of gatherers, each covering one metadata facet;
//!    their output is normalized and accumulated into a deduplicating triple
//!    basket.
//! 2. Format builders read the basket (never the data layer) and render
//!    DataCite kernel-4 XML or JSON, JSON-LD, or Turtle.
//!
//! The data layer is abstracted behind [`ResourceStore`]; the in-memory
//! [`MemoryStore`] loads a whole store from one JSON document, which is also
//! the fixture format used in tests.
//!
//! # Usage
//!
//! ```ignore
//! use metadata_describe::{
//!     datacite, gather_description_set, MemoryStore, VocabRegistry, WalkOptions,
//! };
//!
//! let store = MemoryStore::from_json_str(&fixture_json)?;
//! let vocab = VocabRegistry::default();
//! let options = WalkOptions { max_visits: 10, ..WalkOptions::default() };
//!
//! let description = gather_description_set(&store, &vocab, "abcde", &options)?;
//! println!("{}", datacite::serialize_xml(&description, None)?);
//! ```

pub mod datacite;
pub mod error;
pub mod gather;
pub mod gathering;
pub mod graph;
pub mod manifest;
pub mod render;
pub mod resource;
pub mod sink;
pub mod vocab;

// Re-export main types for convenience
pub use crate::error::MetadataError;
pub use crate::gather::{
    gather_description_set, resolve_focus, DateGranularity, DescriptionSet, WalkOptions,
};
pub use crate::graph::{Basket, Focus, Term, Triple};
pub use crate::render::{render_jsonld, render_jsonld_string, render_turtle};
pub use crate::resource::{
    Describable, MemoryStore, ResourceKind, ResourceRecord, ResourceStore,
};
pub use crate::vocab::VocabRegistry;
