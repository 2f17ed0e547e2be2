/// Snowflake 客户端
///
/// 通过 Snowflake 会话 REST 协议登录并执行语句：
/// - `POST /session/v1/login-request` 用户名/密码换取会话 token
/// - `POST /queries/v1/query-request` 执行单条 SQL（`?` 占位符绑定）
///
/// 整个进程只登录一次，之后所有语句共用同一个会话，
/// 因此 `USE DATABASE` / `USE SCHEMA` 对后续语句生效。
use crate::config::Config;
use crate::error::WarehouseError;
use crate::infrastructure::sql::Identifier;
use crate::infrastructure::warehouse::{QueryResult, Warehouse};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

const CLIENT_APP_ID: &str = "docqa_export";

/// 通用响应外壳
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// 登录失败时 data 里只有 nextAction 等字段，没有 token
#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryData {
    #[serde(default)]
    rowtype: Vec<RowType>,
    #[serde(default)]
    rowset: Vec<Vec<JsonValue>>,
    #[serde(default, rename = "stageInfo")]
    stage_info: Option<StageInfo>,
}

#[derive(Debug, Deserialize)]
struct RowType {
    name: String,
}

#[derive(Debug, Deserialize)]
struct StageInfo {
    #[serde(default, rename = "locationType")]
    location_type: String,
    #[serde(default, rename = "presignedUrl")]
    presigned_url: Option<String>,
}

/// Snowflake 客户端（持有唯一的会话）
pub struct SnowflakeClient {
    http: reqwest::Client,
    base_url: String,
    account: String,
    token: String,
    sequence: AtomicU64,
}

impl SnowflakeClient {
    /// 使用配置中的账户登录
    pub async fn connect(config: &Config) -> Result<Self, WarehouseError> {
        let base_url = format!("https://{}.snowflakecomputing.com", config.snowflake_account);
        Self::connect_to(&base_url, config).await
    }

    /// 登录到指定的服务地址
    pub async fn connect_to(base_url: &str, config: &Config) -> Result<Self, WarehouseError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let account = account_name(&config.snowflake_account).to_string();
        info!("正在登录 Snowflake: {} (用户: {})", base_url, config.snowflake_user);

        let mut query = Vec::new();
        if let Some(warehouse) = &config.snowflake_warehouse {
            query.push(("warehouse", warehouse.as_str()));
        }
        if let Some(role) = &config.snowflake_role {
            query.push(("roleName", role.as_str()));
        }

        let body = json!({
            "data": {
                "CLIENT_APP_ID": CLIENT_APP_ID,
                "CLIENT_APP_VERSION": env!("CARGO_PKG_VERSION"),
                "ACCOUNT_NAME": account,
                "LOGIN_NAME": config.snowflake_user,
                "PASSWORD": config.snowflake_password,
            }
        });

        let envelope: Envelope<LoginData> = http
            .post(format!("{}/session/v1/login-request", base_url))
            .query(&query)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        let token = login_token(envelope, &account)?;

        info!("✓ Snowflake 登录成功");

        Ok(Self {
            http,
            base_url,
            account,
            token,
            sequence: AtomicU64::new(0),
        })
    }

    async fn execute(&self, sql: &str, bindings: &[String]) -> Result<QueryData, WarehouseError> {
        let sequence_id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("执行 SQL #{}: {}", sequence_id, sql);

        let body = json!({
            "sqlText": sql,
            "asyncExec": false,
            "sequenceId": sequence_id,
            "querySubmissionTime": chrono::Utc::now().timestamp_millis(),
            "bindings": build_bindings(bindings),
        });

        let envelope: Envelope<QueryData> = self
            .http
            .post(format!("{}/queries/v1/query-request", self.base_url))
            .query(&[("requestId", uuid::Uuid::new_v4().to_string())])
            .header("Authorization", format!("Snowflake Token=\"{}\"", self.token))
            .header("Accept", "application/snowflake")
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if !envelope.success {
            let message = envelope.message.unwrap_or_else(|| "未知错误".to_string());
            warn!("SQL 执行失败: {}", message);
            return Err(WarehouseError::StatementFailed {
                sql: sql.to_string(),
                message,
            });
        }

        Ok(envelope.data.unwrap_or_default())
    }
}

#[async_trait]
impl Warehouse for SnowflakeClient {
    async fn query(&self, sql: &str, bindings: &[String]) -> Result<QueryResult, WarehouseError> {
        let data = self.execute(sql, bindings).await?;
        Ok(into_query_result(data))
    }

    async fn put_file(&self, local_path: &Path, stage: &Identifier) -> Result<(), WarehouseError> {
        let sql = format!(
            "PUT 'file://{}' @{} AUTO_COMPRESS=FALSE OVERWRITE=TRUE",
            local_path.display().to_string().replace('\\', "/"),
            stage
        );
        let data = self.execute(&sql, &[]).await?;

        // PUT 只返回上传凭据，文件内容需要客户端自己上传到云存储
        let stage_info = data.stage_info.ok_or_else(|| WarehouseError::StatementFailed {
            sql: sql.clone(),
            message: "响应中缺少 stageInfo".to_string(),
        })?;

        let presigned_url = presigned_url(stage_info)?;

        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|e| WarehouseError::RequestFailed {
                endpoint: local_path.display().to_string(),
                source: Box::new(e),
            })?;

        let response = self.http.put(&presigned_url).body(bytes).send().await?;
        if !response.status().is_success() {
            return Err(WarehouseError::StatementFailed {
                sql,
                message: format!("暂存区上传返回 {}", response.status()),
            });
        }

        debug!("文件已上传到暂存区 @{}", stage);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.account
    }
}

/// `xy12345.us-east-1` → `xy12345`
fn account_name(account: &str) -> &str {
    account.split('.').next().unwrap_or(account)
}

/// 位置绑定：`{"1": {"type": "TEXT", "value": ...}, ...}`
fn build_bindings(values: &[String]) -> JsonValue {
    let mut map = Map::new();
    for (i, value) in values.iter().enumerate() {
        map.insert(
            (i + 1).to_string(),
            json!({ "type": "TEXT", "value": value }),
        );
    }
    JsonValue::Object(map)
}

fn into_query_result(data: QueryData) -> QueryResult {
    let columns = data.rowtype.into_iter().map(|r| r.name).collect();
    let rows = data
        .rowset
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    JsonValue::Null => None,
                    JsonValue::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .collect();
    QueryResult { columns, rows }
}

/// 只有预签名 URL 可以直接上传；S3 / AZURE 内部 stage 需要云凭据，不支持
fn presigned_url(stage_info: StageInfo) -> Result<String, WarehouseError> {
    match stage_info.presigned_url {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(WarehouseError::StageUploadUnsupported {
            location_type: stage_info.location_type,
        }),
    }
}

/// 从登录响应中取出会话 token
fn login_token(envelope: Envelope<LoginData>, account: &str) -> Result<String, WarehouseError> {
    match envelope.data.and_then(|data| data.token) {
        Some(token) if envelope.success => Ok(token),
        _ => Err(WarehouseError::LoginFailed {
            account: account.to_string(),
            message: envelope.message.unwrap_or_else(|| "未知错误".to_string()),
        }),
    }
}
