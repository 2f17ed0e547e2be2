use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档解析相关错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// QA 推理服务错误
    #[error("QA错误: {0}")]
    Qa(#[from] QaError),
    /// 数据仓库（Snowflake）错误
    #[error("仓库错误: {0}")]
    Warehouse(#[from] WarehouseError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 会话状态错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 文档解析相关错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 不支持的文件类型
    #[error("不支持的文件类型: {media_type} ({name})")]
    UnsupportedFileType { name: String, media_type: String },
    /// 文件内容无法解析（损坏的 PDF、无法解码的图片等）
    #[error("无法读取文档 {name}: {source}")]
    Unreadable {
        name: String,
        #[source]
        source: BoxedSource,
    },
    /// PDF 没有任何页面
    #[error("文档 {name} 不包含任何页面")]
    NoPages { name: String },
    /// PDF 渲染库不可用
    #[error("PDF 渲染库不可用: {message}")]
    RendererUnavailable { message: String },
}

/// QA 推理服务错误
#[derive(Debug, Error)]
pub enum QaError {
    /// 推理调用失败
    #[error("QA 调用失败 (模型: {model}): {source}")]
    InvocationFailed {
        model: String,
        #[source]
        source: BoxedSource,
    },
    /// 服务返回错误响应
    #[error("QA 服务返回错误 (模型: {model}): status={status}, body={body}")]
    BadResponse {
        model: String,
        status: u16,
        body: String,
    },
    /// 答案数量与问题数量不一致（内部不变量被破坏）
    #[error("答案数量不一致: 期望 {expected} 个, 实际 {actual} 个")]
    AnswerCountMismatch { expected: usize, actual: usize },
}

/// 数据仓库错误
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// 登录失败
    #[error("登录 Snowflake 失败 (账户: {account}): {message}")]
    LoginFailed { account: String, message: String },
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: BoxedSource,
    },
    /// SQL 执行失败
    #[error("SQL 执行失败 ({sql}): {message}")]
    StatementFailed { sql: String, message: String },
    /// 标识符不合法（数据库/模式/表/列名）
    #[error("非法标识符: '{0}'")]
    InvalidIdentifier(String),
    /// 暂存区上传方式不支持
    #[error("不支持的暂存区类型: {location_type}")]
    StageUploadUnsupported { location_type: String },
    /// 暂存用的本地临时文件写入失败
    #[error("临时文件写入失败: {0}")]
    StagingFile(#[source] std::io::Error),
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 导出目标不完整
    #[error("导出目标不完整: 需要选择数据库、模式和表")]
    TargetIncomplete,
    /// 切换数据库/模式失败
    #[error("切换导出上下文失败: {0}")]
    ContextSwitchFailed(#[source] WarehouseError),
    /// 结果表的列名不是合法标识符（未执行任何插入）
    #[error("结果表列名 '{column}' 不合法: {source}")]
    InvalidColumn {
        column: String,
        #[source]
        source: WarehouseError,
    },
    /// 单行插入失败（之前的行已提交）
    #[error("第 {row_index} 行插入失败 (成功 {succeeded} 行, 未插入 {not_inserted} 行): {source}")]
    RowFailed {
        row_index: usize,
        succeeded: usize,
        not_inserted: usize,
        #[source]
        source: WarehouseError,
    },
}

/// 会话状态错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 问题索引超出范围
    #[error("问题索引 {index} 超出范围 (共 {len} 个)")]
    QuestionIndexOutOfRange { index: usize, len: usize },
    /// 行号超出范围（行号从 1 开始）
    #[error("行号 {row} 超出范围 [1, {rows}]")]
    RowOutOfRange { row: usize, rows: usize },
    /// 列索引超出范围
    #[error("列索引 {column} 超出范围 (共 {columns} 列)")]
    ColumnOutOfRange { column: usize, columns: usize },
    /// 行长度与列数不一致
    #[error("第 {row} 行有 {actual} 个值, 但表格有 {expected} 列")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// 当前没有结果表
    #[error("当前没有结果表")]
    NoResultTable,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
}

// ========== 从常见错误类型转换 ==========

impl From<reqwest::Error> for WarehouseError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.path().to_string())
            .unwrap_or_default();
        WarehouseError::RequestFailed {
            endpoint,
            source: Box::new(err),
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建不支持文件类型错误
    pub fn unsupported_file_type(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        AppError::Document(DocumentError::UnsupportedFileType {
            name: name.into(),
            media_type: media_type.into(),
        })
    }

    /// 是否为内部不变量被破坏（需要与用户输入错误区分上报）
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, AppError::Qa(QaError::AnswerCountMismatch { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
