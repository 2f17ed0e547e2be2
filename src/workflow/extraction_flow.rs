//! 批次抽取流程 - 流程层
//!
//! 核心职责：定义"一批文档"的完整处理流程
//!
//! 每个文档依次：
//! 1. 暂存上传（可选，失败只警告）
//! 2. 解析为 QA 模型可用的内容（不支持/损坏 → 跳过）
//! 3. 逐个问题抽取答案（模型失败 → 跳过该文档，或在 fail_fast 下中止整批）
//!
//! 严格顺序执行，不并发调用模型。

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{Config, PdfMode};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{PageRasterizer, QaPipeline, Warehouse};
use crate::models::UploadedDocument;
use crate::services::{AnswerExtractor, DocumentExtractor, Stager};
use crate::workflow::command::Notice;
use crate::workflow::document_ctx::DocumentCtx;

/// 一批文档的处理结果
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 成功处理的文档的答案，按上传顺序
    pub answers: Vec<Vec<String>>,
    /// 成功处理的文档名，与 `answers` 一一对应
    pub processed: Vec<String>,
    /// 被跳过的文档数
    pub skipped: usize,
    pub notices: Vec<Notice>,
}

/// 批次抽取流程
///
/// - 不持有会话状态，只接收文档和问题
/// - 单个文档失败不影响其他文档（除非 fail_fast）
pub struct ExtractionFlow {
    document_extractor: DocumentExtractor,
    answer_extractor: AnswerExtractor,
    stager: Option<Stager>,
    fail_fast: bool,
}

impl ExtractionFlow {
    pub fn new(
        pdf_mode: PdfMode,
        rasterizer: Arc<dyn PageRasterizer>,
        pipeline: Arc<dyn QaPipeline>,
        stager: Option<Stager>,
        fail_fast: bool,
    ) -> Self {
        Self {
            document_extractor: DocumentExtractor::new(pdf_mode, rasterizer),
            answer_extractor: AnswerExtractor::new(pipeline),
            stager,
            fail_fast,
        }
    }

    /// 按配置创建；设置了 `SNOWFLAKE_STAGE` 时启用暂存上传
    pub fn from_config(
        config: &Config,
        rasterizer: Arc<dyn PageRasterizer>,
        pipeline: Arc<dyn QaPipeline>,
        warehouse: Arc<dyn Warehouse>,
    ) -> AppResult<Self> {
        let stager = match &config.snowflake_stage {
            Some(stage) => Some(Stager::new(warehouse, stage)?),
            None => None,
        };
        Ok(Self::new(
            config.pdf_mode,
            rasterizer,
            pipeline,
            stager,
            config.fail_fast,
        ))
    }

    pub async fn run(
        &self,
        documents: &[UploadedDocument],
        questions: &[String],
    ) -> AppResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        let total = documents.len();

        info!("🚀 开始处理 {} 个文档, {} 个问题", total, questions.len());

        for (i, document) in documents.iter().enumerate() {
            let ctx = DocumentCtx::new(i + 1, total, document.name());

            match self.process_document(&ctx, document, questions, &mut outcome).await {
                Ok(answers) => {
                    info!("{} ✓ 完成", ctx);
                    outcome.answers.push(answers);
                    outcome.processed.push(document.name().to_string());
                }
                Err(e) if e.is_invariant_violation() => {
                    error!("{} 🐛 {}", ctx, e);
                    if self.fail_fast {
                        return Err(e);
                    }
                    outcome.notices.push(Notice::from_error(&e));
                    outcome.skipped += 1;
                }
                Err(e @ AppError::Document(_)) => {
                    warn!("{} ⚠️ 已跳过: {}", ctx, e);
                    outcome.notices.push(Notice::warning(format!("{}: {}", document.name(), e)));
                    outcome.skipped += 1;
                }
                Err(e) => {
                    if self.fail_fast {
                        error!("{} ❌ {}，中止本批", ctx, e);
                        return Err(e);
                    }
                    warn!("{} ⚠️ 已跳过: {}", ctx, e);
                    outcome.notices.push(Notice::warning(format!("{}: {}", document.name(), e)));
                    outcome.skipped += 1;
                }
            }
        }

        info!(
            "📊 本批完成: 成功 {}/{}, 跳过 {}",
            outcome.processed.len(),
            total,
            outcome.skipped
        );
        Ok(outcome)
    }

    async fn process_document(
        &self,
        ctx: &DocumentCtx,
        document: &UploadedDocument,
        questions: &[String],
        outcome: &mut BatchOutcome,
    ) -> AppResult<Vec<String>> {
        if let Some(stager) = &self.stager {
            if let Err(e) = stager.stage_document(document).await {
                warn!("{} ⚠️ 暂存上传失败，继续处理: {}", ctx, e);
                outcome
                    .notices
                    .push(Notice::warning(format!("{}: 暂存上传失败: {}", document.name(), e)));
            }
        }

        let content = self.document_extractor.extract(document)?;
        info!("{} 📄 {} ({} 页)", ctx, document.media_type(), content.page_count());

        self.answer_extractor.extract_answers(&content, questions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DocumentError, QaError};
    use crate::infrastructure::{QaCandidate, QaInput};
    use crate::models::MediaType;
    use async_trait::async_trait;
    use std::io::Cursor;

    struct NoRenderer;

    impl PageRasterizer for NoRenderer {
        fn render_pages(&self, _: &str, _: &[u8]) -> Result<Vec<image::RgbaImage>, DocumentError> {
            Err(DocumentError::RendererUnavailable {
                message: "not installed".into(),
            })
        }
    }

    fn no_pdf() -> Arc<dyn PageRasterizer> {
        Arc::new(NoRenderer)
    }

    struct FixedPipeline;

    #[async_trait]
    impl QaPipeline for FixedPipeline {
        async fn answer(&self, _: QaInput<'_>, question: &str) -> Result<Vec<QaCandidate>, QaError> {
            Ok(vec![QaCandidate::new(format!("answer to {}", question), 0.8)])
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    fn png() -> UploadedDocument {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([0, 0, 0]));
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        UploadedDocument::new("scan.png", MediaType::Png, bytes.into_inner())
    }

    fn questions() -> Vec<String> {
        vec!["total".to_string(), "date".to_string()]
    }

    #[tokio::test]
    async fn test_unsupported_document_is_skipped() {
        let flow = ExtractionFlow::new(PdfMode::Pages, no_pdf(), Arc::new(FixedPipeline), None, false);
        let documents = vec![
            UploadedDocument::new("notes.txt", MediaType::parse("text/plain"), b"hi".to_vec()),
            png(),
        ];

        let outcome = flow.run(&documents, &questions()).await.unwrap();
        assert_eq!(outcome.processed, vec!["scan.png"]);
        assert_eq!(outcome.answers, vec![vec!["answer to total", "answer to date"]]);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.notices.len(), 1);
    }

    struct FailingPipeline;

    #[async_trait]
    impl QaPipeline for FailingPipeline {
        async fn answer(&self, _: QaInput<'_>, _: &str) -> Result<Vec<QaCandidate>, QaError> {
            Err(QaError::BadResponse {
                model: "failing".into(),
                status: 503,
                body: "model is loading".into(),
            })
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_qa_failure_isolated_by_default() {
        let flow = ExtractionFlow::new(PdfMode::Pages, no_pdf(), Arc::new(FailingPipeline), None, false);
        let outcome = flow.run(&[png(), png()], &questions()).await.unwrap();
        assert!(outcome.answers.is_empty());
        assert_eq!(outcome.skipped, 2);
    }

    #[tokio::test]
    async fn test_qa_failure_aborts_with_fail_fast() {
        let flow = ExtractionFlow::new(PdfMode::Pages, no_pdf(), Arc::new(FailingPipeline), None, true);
        let err = flow.run(&[png(), png()], &questions()).await.unwrap_err();
        assert!(matches!(err, AppError::Qa(QaError::BadResponse { status: 503, .. })));
    }
}
