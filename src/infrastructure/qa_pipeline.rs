//! 文档问答模型 - 基础设施层
//!
//! 只暴露"对一页内容提一个问题"的能力，返回按得分排序的候选答案。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::QaError;
use crate::models::document::PageImage;

/// 一次问答的输入内容
#[derive(Debug, Clone, Copy)]
pub enum QaInput<'a> {
    /// 单页图像
    Image(&'a PageImage),
    /// 纯文本上下文
    Text(&'a str),
}

/// 候选答案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaCandidate {
    pub answer: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl QaCandidate {
    pub fn new(answer: impl Into<String>, score: f32) -> Self {
        Self {
            answer: answer.into(),
            score,
            start: None,
            end: None,
        }
    }
}

/// 文档问答能力
///
/// 职责：
/// - 对单个输入调用一次模型
/// - 返回按得分从高到低排序的候选答案
/// - 不重试
#[async_trait]
pub trait QaPipeline: Send + Sync {
    async fn answer(&self, input: QaInput<'_>, question: &str) -> Result<Vec<QaCandidate>, QaError>;

    /// 模型名称（用于日志）
    fn model(&self) -> &str;
}
