/// 文档问答推理服务客户端
///
/// 封装对 Hugging Face 风格推理端点的调用：
/// `POST {base}/{model}`，请求体为 `{"inputs": {"image": <base64>, "question": ...}}`
use crate::config::Config;
use crate::error::QaError;
use crate::infrastructure::qa_pipeline::{QaCandidate, QaInput, QaPipeline};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// 推理服务的响应：文档问答返回列表，抽取式问答返回单个对象
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Ranked(Vec<QaCandidate>),
    Single(QaCandidate),
}

/// QA 推理客户端
pub struct InferenceQaClient {
    http: reqwest::Client,
    api_base_url: String,
    api_token: String,
    model_name: String,
}

impl InferenceQaClient {
    /// 创建新的推理客户端
    pub fn new(config: &Config) -> Result<Self, QaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| QaError::InvocationFailed {
                model: config.qa_model_name.clone(),
                source: Box::new(e),
            })?;

        Ok(Self {
            http,
            api_base_url: config.qa_api_base_url.trim_end_matches('/').to_string(),
            api_token: config.qa_api_token.clone(),
            model_name: config.qa_model_name.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.api_base_url, self.model_name)
    }

    fn build_payload(input: QaInput<'_>, question: &str) -> serde_json::Value {
        match input {
            QaInput::Image(page) => json!({
                "inputs": {
                    "image": BASE64.encode(&page.bytes),
                    "question": question,
                }
            }),
            QaInput::Text(context) => json!({
                "inputs": {
                    "question": question,
                    "context": context,
                }
            }),
        }
    }

    fn invocation_failed(&self, source: impl std::error::Error + Send + Sync + 'static) -> QaError {
        QaError::InvocationFailed {
            model: self.model_name.clone(),
            source: Box::new(source),
        }
    }
}

#[async_trait]
impl QaPipeline for InferenceQaClient {
    async fn answer(&self, input: QaInput<'_>, question: &str) -> Result<Vec<QaCandidate>, QaError> {
        debug!("正在调用 QA 模型: {}", self.model_name);
        debug!("问题: {}", question);

        let mut request = self
            .http
            .post(self.endpoint())
            .json(&Self::build_payload(input, question));
        if !self.api_token.is_empty() {
            request = request.bearer_auth(&self.api_token);
        }

        let response = request.send().await.map_err(|e| {
            warn!("QA API 调用失败: {}", e);
            self.invocation_failed(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.invocation_failed(e))?;

        if !status.is_success() {
            warn!("QA API 返回错误状态: {}", status);
            return Err(QaError::BadResponse {
                model: self.model_name.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: InferenceResponse =
            serde_json::from_str(&body).map_err(|e| self.invocation_failed(e))?;

        let mut candidates = match parsed {
            InferenceResponse::Ranked(list) => list,
            InferenceResponse::Single(one) => vec![one],
        };
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!("QA API 调用成功，候选答案 {} 个", candidates.len());

        Ok(candidates)
    }

    fn model(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{MediaType, PageImage};

    #[test]
    fn test_parse_ranked_and_single_responses() {
        let ranked: InferenceResponse = serde_json::from_str(
            r#"[{"answer": "$42.00", "score": 0.9, "start": 3, "end": 3}, {"answer": "42", "score": 0.1}]"#,
        )
        .unwrap();
        match ranked {
            InferenceResponse::Ranked(list) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[0].answer, "$42.00");
                assert_eq!(list[0].start, Some(3));
            }
            InferenceResponse::Single(_) => panic!("expected ranked list"),
        }

        let single: InferenceResponse =
            serde_json::from_str(r#"{"answer": "Jan", "score": 0.5}"#).unwrap();
        assert!(matches!(single, InferenceResponse::Single(c) if c.answer == "Jan"));
    }

    #[test]
    fn test_build_payload() {
        let page = PageImage {
            page_number: 1,
            media_type: MediaType::Png,
            bytes: vec![1, 2, 3],
            dimensions: Some((1, 1)),
        };
        let payload = InferenceQaClient::build_payload(QaInput::Image(&page), "total?");
        assert_eq!(payload["inputs"]["image"], "AQID");
        assert_eq!(payload["inputs"]["question"], "total?");

        let payload = InferenceQaClient::build_payload(QaInput::Text("hello"), "q");
        assert_eq!(payload["inputs"]["context"], "hello");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let mut config = Config::default();
        config.qa_api_base_url = "http://localhost:8080/models/".to_string();
        let client = InferenceQaClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/models/impira/layoutlm-document-qa"
        );
    }
}
