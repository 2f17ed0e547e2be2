//! 基础设施层：持有仓库会话、QA 模型与 PDF 渲染库，只暴露能力

pub mod pdf_renderer;
pub mod qa_pipeline;
pub mod sql;
pub mod warehouse;

pub use pdf_renderer::{PageRasterizer, PdfiumRasterizer};
pub use qa_pipeline::{QaCandidate, QaInput, QaPipeline};
pub use sql::Identifier;
pub use warehouse::{QueryResult, Warehouse};
