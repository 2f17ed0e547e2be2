//! 导出服务 - 业务能力层
//!
//! 只负责"把结果表逐行插入目标表"，不关心表是怎么来的。
//!
//! 每行一条 INSERT，没有事务：第 k 行失败时前 k-1 行已经提交，剩余行不再插入。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::ExportError;
use crate::infrastructure::sql::{self, Identifier};
use crate::infrastructure::warehouse::Warehouse;
use crate::models::table::ResultTable;
use crate::models::target::ExportTarget;

/// 导出结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub inserted: usize,
}

/// 导出服务
pub struct Exporter {
    warehouse: Arc<dyn Warehouse>,
}

impl Exporter {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self { warehouse }
    }

    /// 导出结果表
    ///
    /// 列名与目标表的实际结构不做客户端校验，不匹配时由仓库返回错误。
    pub async fn export(
        &self,
        table: &ResultTable,
        target: &ExportTarget,
    ) -> Result<ExportReport, ExportError> {
        let (database, schema, table_name) = target.resolved().ok_or(ExportError::TargetIncomplete)?;

        let database = Identifier::parse(database).map_err(ExportError::ContextSwitchFailed)?;
        let schema = Identifier::parse(schema).map_err(ExportError::ContextSwitchFailed)?;
        let table_name = Identifier::parse(table_name).map_err(ExportError::ContextSwitchFailed)?;
        let columns = table
            .columns()
            .iter()
            .map(|c| {
                Identifier::parse(c).map_err(|source| ExportError::InvalidColumn {
                    column: c.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "📤 正在导出 {} 行到 {}.{}.{}",
            table.row_count(),
            database,
            schema,
            table_name
        );

        self.warehouse
            .query(&sql::use_database(&database), &[])
            .await
            .map_err(ExportError::ContextSwitchFailed)?;
        self.warehouse
            .query(&sql::use_schema(&schema), &[])
            .await
            .map_err(ExportError::ContextSwitchFailed)?;

        let insert = sql::insert_row(&table_name, &columns);
        let total = table.row_count();
        let mut inserted = 0;

        for (row_index, row) in table.rows() {
            debug!("插入第 {}/{} 行", row_index, total);
            if let Err(source) = self.warehouse.query(&insert, row).await {
                warn!("⚠️ 第 {} 行插入失败: {}", row_index, source);
                return Err(ExportError::RowFailed {
                    row_index,
                    succeeded: inserted,
                    not_inserted: total - inserted,
                    source,
                });
            }
            inserted += 1;
        }

        info!("✓ 导出完成: {} 行", inserted);
        Ok(ExportReport { inserted })
    }
}
