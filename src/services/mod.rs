pub mod answer_extractor;
pub mod catalog;
pub mod document_extractor;
pub mod exporter;
pub mod stager;

pub use answer_extractor::{AnswerExtractor, PAGE_ANSWER_SEPARATOR};
pub use catalog::{Catalog, CatalogChoices};
pub use document_extractor::DocumentExtractor;
pub use exporter::{ExportReport, Exporter};
pub use stager::Stager;
