//! 用户操作与提示消息
//!
//! 每个界面动作对应一个 [`Command`]；处理结果以 [`Notice`] 列表返回给调用方展示。

use std::fmt;

use serde::Serialize;

use crate::error::AppError;
use crate::models::UploadedDocument;

/// 用户操作
#[derive(Debug, Clone)]
pub enum Command {
    AddQuestion,
    DeleteQuestion { index: usize },
    SetQuestion { index: usize, text: String },
    /// 为第 `index` 个问题选择目标列
    SelectColumn { index: usize, column: String },
    SelectDatabase(Option<String>),
    SelectSchema(Option<String>),
    SelectTable(Option<String>),
    /// 上传一批文档并立即处理，生成新的结果表
    Upload(Vec<UploadedDocument>),
    /// 修改单元格（行号从 1 开始，列为位置索引）
    EditCell { row: usize, column: usize, value: String },
    /// 插入空行；`at` 为新行的行号，None 表示追加到末尾
    InsertRow { at: Option<usize> },
    DeleteRow { row: usize },
    Export,
    Reset,
}

impl Command {
    /// 日志中显示的操作名
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddQuestion => "add_question",
            Command::DeleteQuestion { .. } => "delete_question",
            Command::SetQuestion { .. } => "set_question",
            Command::SelectColumn { .. } => "select_column",
            Command::SelectDatabase(_) => "select_database",
            Command::SelectSchema(_) => "select_schema",
            Command::SelectTable(_) => "select_table",
            Command::Upload(_) => "upload",
            Command::EditCell { .. } => "edit_cell",
            Command::InsertRow { .. } => "insert_row",
            Command::DeleteRow { .. } => "delete_row",
            Command::Export => "export",
            Command::Reset => "reset",
        }
    }
}

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
    /// 内部不变量被破坏，与普通错误分开上报
    InvariantViolation,
}

/// 展示给用户的提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// 由错误生成提示；不变量错误使用独立的级别
    pub fn from_error(err: &AppError) -> Self {
        let level = if err.is_invariant_violation() {
            NoticeLevel::InvariantViolation
        } else {
            NoticeLevel::Error
        };
        Self {
            level,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "ℹ️",
            NoticeLevel::Warning => "⚠️",
            NoticeLevel::Error => "❌",
            NoticeLevel::InvariantViolation => "🐛",
        };
        write!(f, "{} {}", tag, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QaError;

    #[test]
    fn test_notice_from_invariant_violation() {
        let err = AppError::Qa(QaError::AnswerCountMismatch {
            expected: 3,
            actual: 2,
        });
        let notice = Notice::from_error(&err);
        assert_eq!(notice.level, NoticeLevel::InvariantViolation);

        let notice = Notice::from_error(&AppError::unsupported_file_type("a.txt", "text/plain"));
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.to_string().starts_with("❌"));
    }

    #[test]
    fn test_notice_serializes_level_in_snake_case() {
        let json = serde_json::to_value(Notice::warning("skipped")).unwrap();
        assert_eq!(json["level"], "warning");
        assert_eq!(json["message"], "skipped");
    }
}
