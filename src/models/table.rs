//! 结果表：每个文档一行，每个目标列一列，行号从 1 开始且连续

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// 结果表
///
/// 行号不单独存储，始终由行的位置推出（第 i 行的行号为 i + 1），
/// 因此任意编辑之后行号都是 1..N 连续的。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// 由每个文档的答案列表构造结果表
    ///
    /// 每个内层序列成为一行，长度必须等于列数。
    pub fn build(
        per_document_answers: Vec<Vec<String>>,
        target_columns: &[String],
    ) -> Result<Self, SessionError> {
        for (i, row) in per_document_answers.iter().enumerate() {
            if row.len() != target_columns.len() {
                return Err(SessionError::RowWidthMismatch {
                    row: i + 1,
                    expected: target_columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self {
            columns: target_columns.to_vec(),
            rows: per_document_answers,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 当前的行号序列：1..=N
    pub fn row_indices(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.rows.len()
    }

    /// 按顺序遍历 (行号, 行)
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i + 1, row.as_slice()))
    }

    /// 按行号和列名取值；列名重复时取最后一个同名列
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let position = self.columns.iter().rposition(|c| c == column)?;
        self.row_slot(row)
            .ok()
            .map(|r| self.rows[r][position].as_str())
    }

    /// 修改单元格（行号从 1 开始，列为位置索引）
    pub fn set_cell(
        &mut self,
        row: usize,
        column: usize,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        let r = self.row_slot(row)?;
        if column >= self.columns.len() {
            return Err(SessionError::ColumnOutOfRange {
                column,
                columns: self.columns.len(),
            });
        }
        self.rows[r][column] = value.into();
        Ok(())
    }

    /// 插入一行空白行；`at` 为新行的行号，None 表示追加到末尾
    ///
    /// 返回新行的行号。
    pub fn insert_row(&mut self, at: Option<usize>) -> Result<usize, SessionError> {
        let position = match at {
            None => self.rows.len(),
            Some(row) if row >= 1 && row <= self.rows.len() + 1 => row - 1,
            Some(row) => {
                return Err(SessionError::RowOutOfRange {
                    row,
                    rows: self.rows.len(),
                })
            }
        };
        self.rows
            .insert(position, vec![String::new(); self.columns.len()]);
        Ok(position + 1)
    }

    /// 删除指定行号的行
    pub fn delete_row(&mut self, row: usize) -> Result<Vec<String>, SessionError> {
        let r = self.row_slot(row)?;
        Ok(self.rows.remove(r))
    }

    fn row_slot(&self, row: usize) -> Result<usize, SessionError> {
        if row == 0 || row > self.rows.len() {
            return Err(SessionError::RowOutOfRange {
                row,
                rows: self.rows.len(),
            });
        }
        Ok(row - 1)
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_width = self.rows.len().to_string().len().max(1);
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        write!(f, "{:>index_width$}", "")?;
        for (column, width) in self.columns.iter().zip(&widths) {
            write!(f, " | {:<width$}", column, width = *width)?;
        }
        writeln!(f)?;

        for (index, row) in self.rows() {
            write!(f, "{:>index_width$}", index)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, " | {:<width$}", cell, width = *width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
