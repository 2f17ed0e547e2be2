//! 会话状态
//!
//! 一个会话持有：问题集合、本批上传的文档、结果表、导出目标。
//! 这里只有纯状态操作，不做任何 I/O。

use crate::error::SessionError;
use crate::models::{ExportTarget, QuestionSet, ResultTable, UploadedDocument};

/// 会话状态
#[derive(Debug, Clone)]
pub struct Session {
    questions: QuestionSet,
    documents: Vec<UploadedDocument>,
    table: Option<ResultTable>,
    target: ExportTarget,
    /// reset 时恢复的导出目标
    default_target: ExportTarget,
}

impl Session {
    pub fn new(default_target: ExportTarget) -> Self {
        Self {
            questions: QuestionSet::new(),
            documents: Vec::new(),
            table: None,
            target: default_target.clone(),
            default_target,
        }
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn questions_mut(&mut self) -> &mut QuestionSet {
        &mut self.questions
    }

    pub fn documents(&self) -> &[UploadedDocument] {
        &self.documents
    }

    pub fn set_documents(&mut self, documents: Vec<UploadedDocument>) {
        self.documents = documents;
    }

    pub fn table(&self) -> Option<&ResultTable> {
        self.table.as_ref()
    }

    pub fn table_mut(&mut self) -> Result<&mut ResultTable, SessionError> {
        self.table.as_mut().ok_or(SessionError::NoResultTable)
    }

    /// 用新表替换旧表（旧表直接丢弃）
    pub fn replace_table(&mut self, table: ResultTable) {
        self.table = Some(table);
    }

    pub fn target(&self) -> &ExportTarget {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut ExportTarget {
        &mut self.target
    }

    /// 恢复初始状态：一个空问题、没有文档、没有结果表、默认导出目标
    pub fn reset(&mut self) {
        self.questions.reset();
        self.documents.clear();
        self.table = None;
        self.target = self.default_target.clone();
    }
}
