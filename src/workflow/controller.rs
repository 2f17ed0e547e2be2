//! 会话控制器 - 流程层
//!
//! 把 [`Command`] 应用到 [`Session`] 上，返回提示；[`Controller::view`] 负责把
//! 当前状态和级联候选项投影为可渲染的 [`SessionView`]。
//!
//! 错误处理约定：
//! - 索引越界、导出失败等返回 `Err`，状态保持不变，由调用方展示
//! - 单个文档被跳过、没有可导出数据等只作为提示返回

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{PageRasterizer, QaPipeline, Warehouse};
use crate::models::{ExportTarget, ResultTable, UploadedDocument};
use crate::services::{Catalog, CatalogChoices, Exporter};
use crate::workflow::command::{Command, Notice};
use crate::workflow::extraction_flow::ExtractionFlow;
use crate::workflow::session::Session;

/// 界面渲染所需的全部状态
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub questions: Vec<QuestionRow>,
    pub documents: Vec<String>,
    pub table: Option<ResultTable>,
    pub target: ExportTarget,
    pub choices: CatalogChoices,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRow {
    pub index: usize,
    pub question: String,
    pub column: String,
}

/// 会话控制器
pub struct Controller {
    session: Session,
    flow: ExtractionFlow,
    catalog: Catalog,
    exporter: Exporter,
}

impl Controller {
    pub fn new(session: Session, flow: ExtractionFlow, warehouse: Arc<dyn Warehouse>) -> Self {
        Self {
            session,
            flow,
            catalog: Catalog::new(warehouse.clone()),
            exporter: Exporter::new(warehouse),
        }
    }

    /// 按配置组装控制器；导出目标默认值取自配置
    pub fn from_config(
        config: &Config,
        warehouse: Arc<dyn Warehouse>,
        pipeline: Arc<dyn QaPipeline>,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> AppResult<Self> {
        let defaults = ExportTarget::new(
            &config.default_database,
            &config.default_schema,
            &config.default_table,
        );
        let flow = ExtractionFlow::from_config(config, rasterizer, pipeline, warehouse.clone())?;
        Ok(Self::new(Session::new(defaults), flow, warehouse))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 执行一个用户操作
    pub async fn dispatch(&mut self, command: Command) -> AppResult<Vec<Notice>> {
        debug!("执行操作: {}", command.name());

        match command {
            Command::AddQuestion => {
                self.session.questions_mut().add();
                Ok(vec![])
            }
            Command::DeleteQuestion { index } => {
                self.session.questions_mut().delete(index)?;
                Ok(vec![])
            }
            Command::SetQuestion { index, text } => {
                self.session.questions_mut().set_question(index, text)?;
                Ok(vec![])
            }
            Command::SelectColumn { index, column } => {
                self.session.questions_mut().set_column(index, column)?;
                Ok(vec![])
            }
            Command::SelectDatabase(database) => {
                self.session.target_mut().select_database(database);
                Ok(vec![])
            }
            Command::SelectSchema(schema) => {
                self.session.target_mut().select_schema(schema);
                Ok(vec![])
            }
            Command::SelectTable(table) => {
                self.session.target_mut().select_table(table);
                Ok(vec![])
            }
            Command::Upload(documents) => self.process_upload(documents).await,
            Command::EditCell { row, column, value } => {
                self.session.table_mut()?.set_cell(row, column, value)?;
                Ok(vec![])
            }
            Command::InsertRow { at } => {
                let row = self.session.table_mut()?.insert_row(at)?;
                Ok(vec![Notice::info(format!("已插入第 {} 行", row))])
            }
            Command::DeleteRow { row } => {
                self.session.table_mut()?.delete_row(row)?;
                Ok(vec![Notice::info(format!("已删除第 {} 行", row))])
            }
            Command::Export => self.export().await,
            Command::Reset => {
                self.session.reset();
                info!("🔄 会话已重置");
                Ok(vec![Notice::info("已重置")])
            }
        }
    }

    /// 处理新上传的一批文档，并用结果替换当前结果表
    async fn process_upload(&mut self, documents: Vec<UploadedDocument>) -> AppResult<Vec<Notice>> {
        let mut notices = Vec::new();

        // 先在副本上完成全部计算，成功后再一次性提交，失败时会话保持原样
        let mut questions = self.session.questions().clone();
        if questions.align_to_columns() {
            warn!("⚠️ 问题数量与目标列数量不一致，已按列对齐");
            notices.push(Notice::warning("问题数量与目标列数量不一致，已按列对齐"));
        }

        let outcome = self.flow.run(&documents, questions.questions()).await?;
        let table = ResultTable::build(outcome.answers, questions.columns())?;

        notices.extend(outcome.notices);
        notices.push(Notice::info(format!(
            "已处理 {} 个文档, 跳过 {} 个",
            outcome.processed.len(),
            outcome.skipped
        )));

        *self.session.questions_mut() = questions;
        self.session.set_documents(documents);
        self.session.replace_table(table);
        Ok(notices)
    }

    async fn export(&self) -> AppResult<Vec<Notice>> {
        let Some(table) = self.session.table() else {
            warn!("⚠️ 没有可导出的数据");
            return Ok(vec![Notice::warning("没有可导出的数据")]);
        };

        let report = self.exporter.export(table, self.session.target()).await?;
        Ok(vec![Notice::info(format!(
            "已导出 {} 行到 Snowflake",
            report.inserted
        ))])
    }

    /// 当前状态的渲染视图
    pub async fn view(&self) -> SessionView {
        let questions = self
            .session
            .questions()
            .pairs()
            .enumerate()
            .map(|(index, (question, column))| QuestionRow {
                index,
                question: question.to_string(),
                column: column.to_string(),
            })
            .collect();

        SessionView {
            questions,
            documents: self
                .session
                .documents()
                .iter()
                .map(|d| d.name().to_string())
                .collect(),
            table: self.session.table().cloned(),
            target: self.session.target().clone(),
            choices: self.catalog.choices_for(self.session.target()).await,
        }
    }
}
