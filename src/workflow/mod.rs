//! 流程层（Workflow Layer）
//!
//! - `session`：会话状态，纯数据操作
//! - `command`：用户操作与提示消息
//! - `extraction_flow`：一批文档的处理流程
//! - `controller`：把操作应用到会话上，并生成渲染视图

pub mod command;
pub mod controller;
pub mod document_ctx;
pub mod extraction_flow;
pub mod session;

pub use command::{Command, Notice, NoticeLevel};
pub use controller::{Controller, QuestionRow, SessionView};
pub use document_ctx::DocumentCtx;
pub use extraction_flow::{BatchOutcome, ExtractionFlow};
pub use session::Session;
