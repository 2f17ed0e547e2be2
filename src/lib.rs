//! # Docqa Export
//!
//! 用文档问答模型从发票等扫描件中抽取字段，整理成可编辑的结果表，并导出到 Snowflake
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 外部能力的抽象，只暴露能力
//! - `Warehouse` - 执行 SQL、上传文件到 stage
//! - `QaPipeline` - 对一张图片或一段文本回答一个问题
//! - `PageRasterizer` - 把 PDF 逐页渲染为位图（pdfium）
//! - `clients/` - 对应的 Snowflake / 推理服务实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只处理一件事
//! - `DocumentExtractor` - 上传文件 → 文本 / 单图 / 多页序列
//! - `AnswerExtractor` - 对一个文档回答一组问题
//! - `Catalog` - 数据库 / 模式 / 表 / 列的级联候选项
//! - `Exporter` - 结果表逐行插入目标表
//! - `Stager` - 原始文件上传到临时 stage
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 会话状态与用户操作
//! - `Session` - 问题集合、文档、结果表、导出目标
//! - `ExtractionFlow` - 一批文档的处理流程（单个失败不影响其他）
//! - `Controller` - 执行 `Command`，生成 `SessionView`
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 应用生命周期，持有仓库会话和 QA 客户端
//! - `orchestrator/job_processor` - 任务文件 → 操作序列
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{InferenceQaClient, SnowflakeClient};
pub use config::{Config, PdfMode};
pub use error::{AppError, AppResult};
pub use infrastructure::{QaCandidate, QaInput, QaPipeline, Warehouse};
pub use models::{ExportTarget, QuestionSet, ResultTable, UploadedDocument};
pub use orchestrator::App;
pub use workflow::{Command, Controller, Notice, Session, SessionView};
