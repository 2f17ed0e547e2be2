//! 批量文档处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源管理和任务回放。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、校验配置、登录 Snowflake、创建 QA 客户端和 PDF 渲染器
//! 2. **任务加载**：读取任务文件和其中列出的文档
//! 3. **任务回放**：把任务翻译成操作序列，逐个交给 `Controller`
//! 4. **全局统计**：输出结果表和处理统计
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有仓库会话和 QA 客户端的模块
//! - **严格顺序**：一次只执行一个操作，不并发

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::clients::{InferenceQaClient, SnowflakeClient};
use crate::config::Config;
use crate::infrastructure::{PageRasterizer, PdfiumRasterizer, QaPipeline, Warehouse};
use crate::models::{load_documents, load_job};
use crate::orchestrator::job_processor;
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};
use crate::workflow::{Command, Controller, Notice, NoticeLevel};

/// 应用主结构
pub struct App {
    config: Config,
    controller: Controller,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        log_startup(&config);

        config.validate().context("Snowflake 凭据不完整")?;

        info!("❄️ 正在登录 Snowflake 账户 {}...", config.snowflake_account);
        let warehouse: Arc<dyn Warehouse> = Arc::new(SnowflakeClient::connect(&config).await?);
        info!("✓ 已连接: {}", warehouse.name());

        let pipeline: Arc<dyn QaPipeline> = Arc::new(InferenceQaClient::new(&config)?);
        info!("✓ QA 模型: {}", pipeline.model());

        let rasterizer: Arc<dyn PageRasterizer> = Arc::new(PdfiumRasterizer::from_config(&config));

        Self::with_backends(config, warehouse, pipeline, rasterizer)
    }

    /// 使用给定的仓库、QA 和 PDF 渲染实现组装应用（不做网络连接）
    pub fn with_backends(
        config: Config,
        warehouse: Arc<dyn Warehouse>,
        pipeline: Arc<dyn QaPipeline>,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Result<Self> {
        let controller = Controller::from_config(&config, warehouse, pipeline, rasterizer)?;
        Ok(Self { config, controller })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// 运行一个任务文件
    pub async fn run(&mut self, job_path: &Path) -> Result<()> {
        info!("\n📁 正在加载任务: {}", job_path.display());
        let job = load_job(job_path).await?;
        let documents = load_documents(&job).await;

        if documents.is_empty() {
            warn!("⚠️ 任务中没有可读取的文档，程序结束");
            return Ok(());
        }

        let total = documents.len();
        info!("✓ 已加载 {} 个文档", total);

        let mut processed = 0;
        let mut exported = None;

        for command in job_processor::plan_commands(&job, documents) {
            let name = command.name();
            let is_upload = matches!(command, Command::Upload(_));
            let is_export = matches!(command, Command::Export);

            match self.controller.dispatch(command).await {
                Ok(notices) => {
                    notices.iter().for_each(report);
                    let table = self.controller.session().table();
                    if is_upload {
                        processed = table.map_or(0, |t| t.row_count());
                    }
                    if is_export {
                        exported = table.map(|t| t.row_count());
                    }
                }
                Err(e) => {
                    error!("操作 {} 失败", name);
                    report(&Notice::from_error(&e));
                }
            }
        }

        match self.controller.session().table() {
            Some(table) => info!("\n📋 结果表:\n{}", table),
            None => warn!("⚠️ 没有生成结果表"),
        }

        if self.config.verbose_logging {
            let view = self.controller.view().await;
            debug!("会话视图:\n{}", serde_json::to_string_pretty(&view)?);
        }

        print_final_stats(processed, total, exported, &self.config.output_log_file);

        Ok(())
    }
}

fn report(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info => info!("{}", notice),
        NoticeLevel::Warning => warn!("{}", notice),
        NoticeLevel::Error | NoticeLevel::InvariantViolation => error!("{}", notice),
    }
}
