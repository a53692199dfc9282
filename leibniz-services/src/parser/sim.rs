//! `SimDocumentParser` - Constant PDF Extraction

use std::path::Path;

use async_trait::async_trait;

use super::{DocumentParser, ParsedAuthor, ParsedDocument, ParsedReference, ParsedSection};
use crate::error::ClientResult;
use crate::settings::DocumentParserOptions;

/// Parser simulation that returns the same document for every path.
///
/// The file is never opened.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use leibniz_services::parser::{DocumentParser, SimDocumentParser};
///
/// #[tokio::main]
/// async fn main() {
///     let parser = SimDocumentParser::default();
///     let doc = parser.process_pdf(Path::new("/no/such/file.pdf")).await.unwrap();
///     assert_eq!(doc.title, "Mock Paper Title from GROBID");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimDocumentParser {
    base_url: String,
}

impl SimDocumentParser {
    /// Create a parser. The base URL is kept for parity with the real service.
    #[must_use]
    pub fn new(options: &DocumentParserOptions) -> Self {
        Self {
            base_url: options.base_url.clone(),
        }
    }

    /// Configured service URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fixture() -> ParsedDocument {
        ParsedDocument {
            title: "Mock Paper Title from GROBID".to_string(),
            abstract_text: "This is a mock abstract extracted by GROBID.".to_string(),
            authors: vec![
                ParsedAuthor {
                    name: "John Doe".to_string(),
                    affiliation: "Mock University".to_string(),
                },
                ParsedAuthor {
                    name: "Jane Smith".to_string(),
                    affiliation: "Research Lab".to_string(),
                },
            ],
            sections: vec![
                ParsedSection {
                    title: "Introduction".to_string(),
                    text: "This paper introduces novel approaches to...".to_string(),
                },
                ParsedSection {
                    title: "Methods".to_string(),
                    text: "We propose the following methodology...".to_string(),
                },
            ],
            references: vec![ParsedReference {
                title: "Referenced Paper 1".to_string(),
                authors: vec!["Author A".to_string(), "Author B".to_string()],
                year: "2022".to_string(),
            }],
        }
    }
}

#[async_trait]
impl DocumentParser for SimDocumentParser {
    #[tracing::instrument(level = "trace", skip(self))]
    async fn process_pdf(&self, path: &Path) -> ClientResult<ParsedDocument> {
        Ok(Self::fixture())
    }

    fn name(&self) -> &'static str {
        "sim-parser"
    }

    fn is_simulation(&self) -> bool {
        true
    }
}
