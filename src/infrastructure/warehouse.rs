//! 数据仓库连接 - 基础设施层
//!
//! 整个进程只持有一个仓库会话，所有操作复用同一个句柄。

use async_trait::async_trait;
use std::path::Path;

use crate::error::WarehouseError;
use crate::infrastructure::sql::Identifier;

/// 查询结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// 列名
    pub columns: Vec<String>,
    /// 行数据，NULL 为 None
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    /// 取出某一列的所有非空值
    ///
    /// 优先按列名（不区分大小写）查找，找不到时退回到位置 `fallback_index`。
    pub fn column_values(&self, name: &str, fallback_index: usize) -> Vec<String> {
        let index = self
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .unwrap_or(fallback_index);

        self.rows
            .iter()
            .filter_map(|row| row.get(index).cloned().flatten())
            .collect()
    }
}

/// 数据仓库能力
///
/// 职责：
/// - 执行单条 SQL（值通过 `?` 占位符绑定）
/// - 上传本地文件到暂存区
/// - 不认识 Question / ResultTable
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// 执行一条语句；每条语句独立提交
    async fn query(&self, sql: &str, bindings: &[String]) -> Result<QueryResult, WarehouseError>;

    /// 将本地文件上传到暂存区
    async fn put_file(&self, local_path: &Path, stage: &Identifier) -> Result<(), WarehouseError>;

    /// 仓库名称（用于日志）
    fn name(&self) -> &str;
}
