//! SQL 标识符校验与语句构造
//!
//! 标识符（数据库/模式/表/列名）无法通过参数绑定传递，只能拼接进 SQL，
//! 因此拼接前必须先经过白名单校验。值一律使用 `?` 占位符绑定。

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::WarehouseError;

const MAX_IDENTIFIER_LEN: usize = 255;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
    })
}

/// 校验过的 SQL 标识符
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(raw: &str) -> Result<Self, WarehouseError> {
        let trimmed = raw.trim();
        if trimmed.len() > MAX_IDENTIFIER_LEN || !identifier_pattern().is_match(trimmed) {
            return Err(WarehouseError::InvalidIdentifier(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn show_databases() -> String {
    "SHOW DATABASES".to_string()
}

pub fn show_schemas(database: &Identifier) -> String {
    format!("SHOW SCHEMAS IN DATABASE {}", database)
}

pub fn show_tables(database: &Identifier, schema: &Identifier) -> String {
    format!("SHOW TABLES IN {}.{}", database, schema)
}

pub fn describe_table(database: &Identifier, schema: &Identifier, table: &Identifier) -> String {
    format!("DESCRIBE TABLE {}.{}.{}", database, schema, table)
}

pub fn use_database(database: &Identifier) -> String {
    format!("USE DATABASE {}", database)
}

pub fn use_schema(schema: &Identifier) -> String {
    format!("USE SCHEMA {}", schema)
}

pub fn create_temporary_stage(stage: &Identifier) -> String {
    format!("CREATE OR REPLACE TEMPORARY STAGE {}", stage)
}

/// `INSERT INTO t (a, b) VALUES (?, ?)`
pub fn insert_row(table: &Identifier, columns: &[Identifier]) -> String {
    let column_list = columns
        .iter()
        .map(Identifier::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table, column_list, placeholders
    )
}
