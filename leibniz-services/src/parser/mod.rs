//! Document Parsing - PDF Structure Extraction
//!
//! `TigerStyle`: Simulation-only.
//!
//! Only [`SimDocumentParser`] exists; the factory always hands it out.

mod sim;

pub use sim::SimDocumentParser;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;

/// A paper author as extracted from the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAuthor {
    /// Full name
    pub name: String,
    /// Institution
    pub affiliation: String,
}

/// A body section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSection {
    /// Section heading
    pub title: String,
    /// Section text
    pub text: String,
}

/// A bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReference {
    /// Cited title
    pub title: String,
    /// Cited authors
    pub authors: Vec<String>,
    /// Publication year as printed
    pub year: String,
}

/// Structured content of one PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Title
    pub title: String,
    /// Abstract
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Authors in byline order
    pub authors: Vec<ParsedAuthor>,
    /// Body sections in document order
    pub sections: Vec<ParsedSection>,
    /// Bibliography
    pub references: Vec<ParsedReference>,
}

/// Trait for PDF parsing clients.
#[async_trait]
pub trait DocumentParser: Send + Sync + std::fmt::Debug {
    /// Extract structure from the PDF at `path`.
    async fn process_pdf(&self, path: &Path) -> ClientResult<ParsedDocument>;

    /// Get the client name for logging/debugging.
    fn name(&self) -> &'static str;

    /// Check if this is a simulation client.
    fn is_simulation(&self) -> bool;
}
