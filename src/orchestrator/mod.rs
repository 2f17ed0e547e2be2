//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源管理和任务回放，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用生命周期
//! - 初始化日志、配置校验、仓库会话、QA 客户端
//! - 加载任务文件与文档
//! - 输出结果表和全局统计
//!
//! ### `job_processor` - 任务回放
//! - 把任务文件翻译为 `Command` 序列
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理一个任务)
//!     ↓
//! job_processor (任务 → Vec<Command>)
//!     ↓
//! workflow::Controller (处理单个 Command)
//!     ↓
//! services (能力层：解析 / 问答 / 目录 / 导出 / 暂存)
//!     ↓
//! infrastructure (基础设施：Warehouse / QaPipeline)
//! ```

pub mod batch_processor;
pub mod job_processor;

// 重新导出主要类型
pub use batch_processor::App;
pub use job_processor::plan_commands;
