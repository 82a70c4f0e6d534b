//! External collaborator traits and in-memory implementations.

pub mod extractor;

pub use extractor::{
    DerivedExtractor, ExtractionError, InMemoryDerivedExtractor, StructuredPayload,
};
