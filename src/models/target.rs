use serde::{Deserialize, Serialize};

/// 导出目标 (数据库, 模式, 表)
///
/// 级联选择：更换数据库会清空模式和表，更换模式会清空表。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTarget {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub table: Option<String>,
}

impl ExportTarget {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: Some(database.into()),
            schema: Some(schema.into()),
            table: Some(table.into()),
        }
    }

    pub fn select_database(&mut self, database: Option<String>) {
        if self.database != database {
            self.schema = None;
            self.table = None;
        }
        self.database = database;
    }

    pub fn select_schema(&mut self, schema: Option<String>) {
        if self.schema != schema {
            self.table = None;
        }
        self.schema = schema;
    }

    pub fn select_table(&mut self, table: Option<String>) {
        self.table = table;
    }

    /// 三者都已选择时返回 (数据库, 模式, 表)
    pub fn resolved(&self) -> Option<(&str, &str, &str)> {
        match (&self.database, &self.schema, &self.table) {
            (Some(d), Some(s), Some(t)) => Some((d, s, t)),
            _ => None,
        }
    }
}
