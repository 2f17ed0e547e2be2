//! 答案抽取服务 - 业务能力层
//!
//! 只负责"对一个文档回答一组问题"，不关心批次和结果表。
//!
//! - 单张图片 / 纯文本：每个问题调用一次模型，取得分最高的答案
//! - 多页文档：每个问题按页序逐页调用，各页最高答案以单个空格拼接

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{AppError, AppResult, QaError};
use crate::infrastructure::qa_pipeline::{QaInput, QaPipeline};
use crate::models::document::DocumentContent;

/// 多页答案的拼接分隔符
pub const PAGE_ANSWER_SEPARATOR: &str = " ";

/// 答案抽取服务
///
/// 职责：
/// - 保证答案与问题一一对应、顺序一致
/// - 不重试，模型调用失败直接返回
pub struct AnswerExtractor {
    pipeline: Arc<dyn QaPipeline>,
}

impl AnswerExtractor {
    pub fn new(pipeline: Arc<dyn QaPipeline>) -> Self {
        Self { pipeline }
    }

    /// 对一个文档依次回答所有问题
    ///
    /// # 返回
    /// 与 `questions` 等长、同序的答案列表
    pub async fn extract_answers(
        &self,
        content: &DocumentContent,
        questions: &[String],
    ) -> AppResult<Vec<String>> {
        let mut answers = Vec::with_capacity(questions.len());

        for question in questions {
            let answer = match content {
                DocumentContent::SingleImage(page) => {
                    self.top_answer(QaInput::Image(page), question).await?
                }
                DocumentContent::PlainText(text) => {
                    self.top_answer(QaInput::Text(text), question).await?
                }
                DocumentContent::ImageSequence(pages) => {
                    let mut page_answers = Vec::with_capacity(pages.len());
                    for page in pages {
                        let answer = self.top_answer(QaInput::Image(page), question).await?;
                        debug!("第 {} 页答案: {}", page.page_number, answer);
                        page_answers.push(answer);
                    }
                    page_answers.join(PAGE_ANSWER_SEPARATOR)
                }
            };
            answers.push(answer);
        }

        if answers.len() != questions.len() {
            return Err(AppError::Qa(QaError::AnswerCountMismatch {
                expected: questions.len(),
                actual: answers.len(),
            }));
        }

        Ok(answers)
    }

    /// 调用一次模型并取排名第一的答案；没有候选时返回空字符串
    async fn top_answer(&self, input: QaInput<'_>, question: &str) -> AppResult<String> {
        let candidates = self.pipeline.answer(input, question).await?;

        match candidates.into_iter().next() {
            Some(best) => {
                debug!("最佳答案: {} (得分: {:.3})", best.answer, best.score);
                Ok(best.answer)
            }
            None => {
                warn!("模型 {} 对问题 '{}' 没有返回答案", self.pipeline.model(), question);
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::qa_pipeline::QaCandidate;
    use crate::models::document::{MediaType, PageImage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 按页码和问题返回固定答案的模型
    struct PageEchoPipeline {
        calls: Mutex<Vec<(u32, String)>>,
        fail_on: Option<String>,
    }

    impl PageEchoPipeline {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }
    }

    #[async_trait]
    impl QaPipeline for PageEchoPipeline {
        async fn answer(&self, input: QaInput<'_>, question: &str) -> Result<Vec<QaCandidate>, QaError> {
            if self.fail_on.as_deref() == Some(question) {
                return Err(QaError::BadResponse {
                    model: "echo".into(),
                    status: 503,
                    body: "loading".into(),
                });
            }
            let page = match input {
                QaInput::Image(page) => page.page_number,
                QaInput::Text(_) => 0,
            };
            self.calls.lock().unwrap().push((page, question.to_string()));
            if question == "empty" {
                return Ok(vec![]);
            }
            Ok(vec![
                QaCandidate::new(format!("p{}:{}", page, question), 0.9),
                QaCandidate::new("runner-up", 0.1),
            ])
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    fn page(n: u32) -> PageImage {
        PageImage {
            page_number: n,
            media_type: MediaType::Png,
            bytes: vec![],
            dimensions: Some((10, 10)),
        }
    }

    fn questions(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_single_image_one_answer_per_question() {
        let pipeline = Arc::new(PageEchoPipeline::new());
        let extractor = AnswerExtractor::new(pipeline.clone());

        let answers = extractor
            .extract_answers(&DocumentContent::SingleImage(page(1)), &questions(&["a", "b", "c"]))
            .await
            .unwrap();

        assert_eq!(answers, vec!["p1:a", "p1:b", "p1:c"]);
        assert_eq!(pipeline.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_multi_page_answers_joined_in_page_order() {
        let pipeline = Arc::new(PageEchoPipeline::new());
        let extractor = AnswerExtractor::new(pipeline.clone());
        let content = DocumentContent::ImageSequence(vec![page(1), page(2), page(3)]);

        let answers = extractor
            .extract_answers(&content, &questions(&["q"]))
            .await
            .unwrap();

        assert_eq!(answers, vec!["p1:q p2:q p3:q"]);
        let calls = pipeline.calls.lock().unwrap();
        assert_eq!(
            calls.iter().map(|(p, _)| *p).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_plain_text_and_empty_candidates() {
        let extractor = AnswerExtractor::new(Arc::new(PageEchoPipeline::new()));
        let answers = extractor
            .extract_answers(
                &DocumentContent::PlainText("invoice".into()),
                &questions(&["total", "empty"]),
            )
            .await
            .unwrap();
        assert_eq!(answers, vec!["p0:total", ""]);
    }

    #[tokio::test]
    async fn test_no_questions_yields_no_answers() {
        let extractor = AnswerExtractor::new(Arc::new(PageEchoPipeline::new()));
        let answers = extractor
            .extract_answers(&DocumentContent::SingleImage(page(1)), &[])
            .await
            .unwrap();
        assert!(answers.is_empty());
    }

    #[tokio::test]
    async fn test_pipeline_failure_propagates() {
        let mut pipeline = PageEchoPipeline::new();
        pipeline.fail_on = Some("b".into());
        let extractor = AnswerExtractor::new(Arc::new(pipeline));

        let err = extractor
            .extract_answers(&DocumentContent::SingleImage(page(1)), &questions(&["a", "b"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Qa(QaError::BadResponse { status: 503, .. })));
    }
}
