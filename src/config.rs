use crate::error::ConfigError;

/// PDF 处理模式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PdfMode {
    /// 按页拆分，每页单独送入 QA 模型，答案按页序拼接
    Pages,
    /// 提取全文文本，作为单个上下文送入 QA 模型
    Text,
}

impl PdfMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pages" | "page" | "images" => Some(PdfMode::Pages),
            "text" => Some(PdfMode::Text),
            _ => None,
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    // --- Snowflake 配置 ---
    pub snowflake_user: String,
    pub snowflake_password: String,
    pub snowflake_account: String,
    pub snowflake_warehouse: Option<String>,
    pub snowflake_role: Option<String>,
    /// 上传文件使用的临时暂存区（未设置则不上传）
    pub snowflake_stage: Option<String>,
    // --- QA 模型配置 ---
    pub qa_api_base_url: String,
    pub qa_api_token: String,
    pub qa_model_name: String,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// PDF 处理模式
    pub pdf_mode: PdfMode,
    /// pdfium 动态库所在目录（未设置则使用系统库）
    pub pdfium_library_dir: Option<String>,
    /// PDF 页面渲染宽度（像素）
    pub pdf_render_width: u32,
    // --- 导出目标默认值（重置时恢复） ---
    pub default_database: String,
    pub default_schema: String,
    pub default_table: String,
    /// 某个文档处理失败时是否中止整批
    pub fail_fast: bool,
    /// 任务描述文件
    pub job_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snowflake_user: String::new(),
            snowflake_password: String::new(),
            snowflake_account: String::new(),
            snowflake_warehouse: None,
            snowflake_role: None,
            snowflake_stage: None,
            qa_api_base_url: "https://api-inference.huggingface.co/models".to_string(),
            qa_api_token: String::new(),
            qa_model_name: "impira/layoutlm-document-qa".to_string(),
            request_timeout_secs: 120,
            pdf_mode: PdfMode::Pages,
            pdfium_library_dir: None,
            pdf_render_width: 1600,
            default_database: "Invoices".to_string(),
            default_schema: "public".to_string(),
            default_table: "table1".to_string(),
            fail_fast: false,
            job_file: "job.toml".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置（会先读取当前目录下的 `.env`）
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let default = Self::default();
        Self {
            snowflake_user: std::env::var("SNOWFLAKE_USER").unwrap_or(default.snowflake_user),
            snowflake_password: std::env::var("SNOWFLAKE_PASSWORD").unwrap_or(default.snowflake_password),
            snowflake_account: std::env::var("SNOWFLAKE_ACCOUNT").unwrap_or(default.snowflake_account),
            snowflake_warehouse: non_empty_var("SNOWFLAKE_WAREHOUSE"),
            snowflake_role: non_empty_var("SNOWFLAKE_ROLE"),
            snowflake_stage: non_empty_var("SNOWFLAKE_STAGE"),
            qa_api_base_url: std::env::var("QA_API_BASE_URL").unwrap_or(default.qa_api_base_url),
            qa_api_token: std::env::var("QA_API_TOKEN").unwrap_or(default.qa_api_token),
            qa_model_name: std::env::var("QA_MODEL_NAME").unwrap_or(default.qa_model_name),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            pdf_mode: std::env::var("PDF_MODE").ok().and_then(|v| PdfMode::parse(&v)).unwrap_or(default.pdf_mode),
            pdfium_library_dir: non_empty_var("PDFIUM_LIBRARY_DIR"),
            pdf_render_width: std::env::var("PDF_RENDER_WIDTH").ok().and_then(|v| v.parse().ok()).filter(|w| *w > 0).unwrap_or(default.pdf_render_width),
            default_database: std::env::var("DEFAULT_DATABASE").unwrap_or(default.default_database),
            default_schema: std::env::var("DEFAULT_SCHEMA").unwrap_or(default.default_schema),
            default_table: std::env::var("DEFAULT_TABLE").unwrap_or(default.default_table),
            fail_fast: std::env::var("FAIL_FAST").ok().and_then(|v| v.parse().ok()).unwrap_or(default.fail_fast),
            job_file: std::env::var("JOB_FILE").unwrap_or(default.job_file),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 检查连接 Snowflake 所需的凭据是否齐全
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("SNOWFLAKE_USER", &self.snowflake_user),
            ("SNOWFLAKE_PASSWORD", &self.snowflake_password),
            ("SNOWFLAKE_ACCOUNT", &self.snowflake_account),
        ];
        for (var_name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::EnvVarNotFound {
                    var_name: var_name.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
