//! 元数据目录服务 - 业务能力层
//!
//! 为级联下拉框提供候选项：数据库 → 模式 → 表 → 列。
//! 查询失败时降级为空列表，只记录警告，不中断交互。

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::WarehouseError;
use crate::infrastructure::sql::{self, Identifier};
use crate::infrastructure::warehouse::Warehouse;
use crate::models::target::ExportTarget;

/// 某个导出目标下的全部候选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogChoices {
    pub databases: Vec<String>,
    pub schemas: Vec<String>,
    pub tables: Vec<String>,
    pub columns: Vec<String>,
}

/// 元数据目录服务
pub struct Catalog {
    warehouse: Arc<dyn Warehouse>,
}

impl Catalog {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self { warehouse }
    }

    pub async fn list_databases(&self) -> Result<Vec<String>, WarehouseError> {
        let result = self.warehouse.query(&sql::show_databases(), &[]).await?;
        Ok(result.column_values("name", 1))
    }

    pub async fn list_schemas(&self, database: &str) -> Result<Vec<String>, WarehouseError> {
        let database = Identifier::parse(database)?;
        let result = self.warehouse.query(&sql::show_schemas(&database), &[]).await?;
        Ok(result.column_values("name", 1))
    }

    pub async fn list_tables(&self, database: &str, schema: &str) -> Result<Vec<String>, WarehouseError> {
        let database = Identifier::parse(database)?;
        let schema = Identifier::parse(schema)?;
        let result = self
            .warehouse
            .query(&sql::show_tables(&database, &schema), &[])
            .await?;
        Ok(result.column_values("name", 1))
    }

    pub async fn describe_columns(
        &self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<String>, WarehouseError> {
        let database = Identifier::parse(database)?;
        let schema = Identifier::parse(schema)?;
        let table = Identifier::parse(table)?;
        let result = self
            .warehouse
            .query(&sql::describe_table(&database, &schema, &table), &[])
            .await?;
        Ok(result.column_values("name", 0))
    }

    /// 按级联关系计算当前目标下的全部候选项
    ///
    /// 上级未选择时下级为空；任何一级查询失败都降级为空列表。
    pub async fn choices_for(&self, target: &ExportTarget) -> CatalogChoices {
        let mut choices = CatalogChoices {
            databases: or_empty("数据库", self.list_databases().await),
            ..Default::default()
        };

        let Some(database) = target.database.as_deref() else {
            return choices;
        };
        choices.schemas = or_empty("模式", self.list_schemas(database).await);

        let Some(schema) = target.schema.as_deref() else {
            return choices;
        };
        choices.tables = or_empty("表", self.list_tables(database, schema).await);

        let Some(table) = target.table.as_deref() else {
            return choices;
        };
        choices.columns = or_empty("列", self.describe_columns(database, schema, table).await);

        choices
    }
}

fn or_empty(kind: &str, result: Result<Vec<String>, WarehouseError>) -> Vec<String> {
    match result {
        Ok(values) => values,
        Err(e) => {
            warn!("⚠️ 获取{}列表失败，使用空列表: {}", kind, e);
            Vec::new()
        }
    }
}
