//! 任务回放 - 编排层
//!
//! 把一个任务文件翻译成与界面操作相同的 [`Command`] 序列：
//!
//! 1. 问题与目标列
//! 2. 导出目标（可选）
//! 3. 上传文档（触发处理）
//! 4. 单元格修改
//! 5. 导出（可选）

use tracing::{info, warn};

use crate::models::{Job, UploadedDocument};
use crate::utils::truncate_text;
use crate::workflow::Command;

/// 生成任务对应的操作序列（会话须为初始状态）
pub fn plan_commands(job: &Job, documents: Vec<UploadedDocument>) -> Vec<Command> {
    let mut commands = Vec::new();

    if job.questions.is_empty() {
        warn!("⚠️ 任务中没有问题，结果表将没有任何列");
        commands.push(Command::DeleteQuestion { index: 0 });
    }

    for (index, item) in job.questions.iter().enumerate() {
        info!(
            "❓ 问题 {}: {} → {}",
            index + 1,
            truncate_text(&item.question, 40),
            item.column
        );
        if index > 0 {
            commands.push(Command::AddQuestion);
        }
        commands.push(Command::SetQuestion {
            index,
            text: item.question.clone(),
        });
        commands.push(Command::SelectColumn {
            index,
            column: item.column.clone(),
        });
    }

    if let Some(target) = &job.target {
        commands.push(Command::SelectDatabase(Some(target.database.clone())));
        commands.push(Command::SelectSchema(Some(target.schema.clone())));
        commands.push(Command::SelectTable(Some(target.table.clone())));
    }

    commands.push(Command::Upload(documents));

    for edit in &job.edits {
        // 列名重复时以最后一个为准，与结果表按名取值一致
        match job.questions.iter().rposition(|q| q.column == edit.column) {
            Some(column) => commands.push(Command::EditCell {
                row: edit.row,
                column,
                value: edit.value.clone(),
            }),
            None => warn!("⚠️ 修改引用了不存在的列 '{}'，已忽略", edit.column),
        }
    }

    if job.export {
        commands.push(Command::Export);
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellEdit, JobQuestion, JobTarget};

    fn question(q: &str, c: &str) -> JobQuestion {
        JobQuestion {
            question: q.to_string(),
            column: c.to_string(),
        }
    }

    fn names(commands: &[Command]) -> Vec<&'static str> {
        commands.iter().map(Command::name).collect()
    }

    #[test]
    fn test_full_job_plan_order() {
        let job = Job {
            questions: vec![question("What is the total?", "total"), question("Date?", "date")],
            target: Some(JobTarget {
                database: "Invoices".into(),
                schema: "public".into(),
                table: "table1".into(),
            }),
            edits: vec![CellEdit {
                row: 1,
                column: "date".into(),
                value: "Feb 2024".into(),
            }],
            export: true,
            ..Default::default()
        };

        let commands = plan_commands(&job, vec![]);
        assert_eq!(
            names(&commands),
            vec![
                "set_question",
                "select_column",
                "add_question",
                "set_question",
                "select_column",
                "select_database",
                "select_schema",
                "select_table",
                "upload",
                "edit_cell",
                "export",
            ]
        );
        assert!(matches!(
            commands[9],
            Command::EditCell { row: 1, column: 1, .. }
        ));
    }

    #[test]
    fn test_edit_uses_last_duplicate_column() {
        let job = Job {
            questions: vec![question("a", "total"), question("b", "total")],
            edits: vec![CellEdit {
                row: 1,
                column: "total".into(),
                value: "x".into(),
            }],
            ..Default::default()
        };
        let commands = plan_commands(&job, vec![]);
        assert!(commands
            .iter()
            .any(|c| matches!(c, Command::EditCell { column: 1, .. })));
    }

    #[test]
    fn test_unknown_edit_column_and_empty_questions() {
        let job = Job {
            edits: vec![CellEdit {
                row: 1,
                column: "missing".into(),
                value: "x".into(),
            }],
            ..Default::default()
        };
        let commands = plan_commands(&job, vec![]);
        assert_eq!(names(&commands), vec!["delete_question", "upload"]);
    }
}
