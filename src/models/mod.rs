pub mod document;
pub mod job;
pub mod loaders;
pub mod question;
pub mod table;
pub mod target;

pub use document::{DocumentContent, MediaType, PageImage, UploadedDocument};
pub use job::{CellEdit, Job, JobQuestion, JobTarget};
pub use loaders::{load_document, load_documents, load_job};
pub use question::QuestionSet;
pub use table::ResultTable;
pub use target::ExportTarget;
