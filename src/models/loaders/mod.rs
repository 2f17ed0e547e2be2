pub mod toml_loader;

pub use toml_loader::{load_document, load_documents, load_job};
