//! 问题集合：问题与目标列按位置一一对应

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// 问题集合
///
/// 不变量：`questions.len() == columns.len()`，所有修改方法都保持这一点。
/// 反序列化同样经过 [`QuestionSet::from_parts`] 对齐。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawQuestionSet")]
pub struct QuestionSet {
    questions: Vec<String>,
    columns: Vec<String>,
}

#[derive(Deserialize)]
struct RawQuestionSet {
    #[serde(default)]
    questions: Vec<String>,
    #[serde(default)]
    columns: Vec<String>,
}

impl From<RawQuestionSet> for QuestionSet {
    fn from(raw: RawQuestionSet) -> Self {
        Self::from_parts(raw.questions, raw.columns)
    }
}

impl Default for QuestionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionSet {
    /// 创建只含一个空问题的集合
    pub fn new() -> Self {
        Self {
            questions: vec![String::new()],
            columns: vec![String::new()],
        }
    }

    /// 由两个可能不等长的序列构造，以列数为准对齐
    pub fn from_parts(questions: Vec<String>, columns: Vec<String>) -> Self {
        let mut set = Self { questions, columns };
        set.align_to_columns();
        set
    }

    /// 问题数量
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 按位置遍历 (问题, 列)
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.questions
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(String::as_str))
    }

    /// 在末尾追加一对空的问题与列
    pub fn add(&mut self) {
        self.questions.push(String::new());
        self.columns.push(String::new());
    }

    /// 删除指定位置的问题与列，其余元素保持相对顺序
    ///
    /// 允许删除最后一个问题（数量变为 0），之后 `add` 可恢复。
    pub fn delete(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.len() {
            return Err(SessionError::QuestionIndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        self.questions.remove(index);
        self.columns.remove(index);
        Ok(())
    }

    /// 恢复为只含一个空问题
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn set_question(&mut self, index: usize, text: impl Into<String>) -> Result<(), SessionError> {
        let len = self.len();
        let slot = self
            .questions
            .get_mut(index)
            .ok_or(SessionError::QuestionIndexOutOfRange { index, len })?;
        *slot = text.into();
        Ok(())
    }

    pub fn set_column(&mut self, index: usize, column: impl Into<String>) -> Result<(), SessionError> {
        let len = self.len();
        let slot = self
            .columns
            .get_mut(index)
            .ok_or(SessionError::QuestionIndexOutOfRange { index, len })?;
        *slot = column.into();
        Ok(())
    }

    /// 以列数为准对齐问题序列：不足补空字符串，多余截断
    ///
    /// 返回是否发生了调整。
    pub fn align_to_columns(&mut self) -> bool {
        let target = self.columns.len();
        if self.questions.len() == target {
            return false;
        }
        self.questions.resize(target, String::new());
        true
    }
}
