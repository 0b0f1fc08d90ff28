use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 对战流程错误
    #[error("对战错误: {0}")]
    Battle(#[from] BattleError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 后端返回非 2xx 响应，message 取自 FastAPI 的 `detail`
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 只接受 PDF 文件
    #[error("只允许上传 PDF 文件: {path}")]
    NotPdf { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 对战流程错误
#[derive(Debug, Error)]
pub enum BattleError {
    /// 当前状态不允许该操作
    #[error("状态错误: 需要 {expected}, 当前为 {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
    /// 偏好标签不属于本场对战
    #[error("未知标签: {label} (可选: {available:?})")]
    UnknownLabel {
        label: String,
        available: Vec<String>,
    },
    /// 页码超出范围
    #[error("页码 {page} 超出范围 [1, {page_count}]")]
    PageOutOfRange { page: u32, page_count: u32 },
    /// 对比响应中缺少对战元数据
    #[error("对比响应中缺少 battle_metadata")]
    MissingMetadata,
    /// 对战至少需要两个不同的 provider
    #[error("对战至少需要 2 个不同的 provider，当前 {count} 个")]
    NotEnoughProviders { count: usize },
    /// 后端分配的标签不是两两对战
    #[error("对战应分配 2 个标签，后端返回 {labels:?}")]
    InvalidAssignment { labels: Vec<String> },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少 provider 的 API key
    #[error("缺少 {provider} 的 API key，请在设置文件 [api_keys] 中配置")]
    MissingApiKey { provider: String },
    /// 未知的 provider 名称
    #[error("未知的 provider: {name} (可选: llamaindex, reducto, landingai)")]
    UnknownProvider { name: String },
    /// 参数取值非法
    #[error("参数 {name} 取值非法: {value} ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建后端错误响应
    pub fn bad_response(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为"对战记录尚未落库"的竞态错误
    ///
    /// 后端在对战结果写入前收到反馈时返回 "Battle run not found"，此类错误可以重试。
    pub fn is_battle_not_found(&self) -> bool {
        match self {
            AppError::Api(ApiError::BadResponse { message, .. }) => message
                .to_lowercase()
                .contains("battle run not found"),
            _ => false,
        }
    }

    /// 面向用户的简短错误信息（对应页面上的内联错误文本）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(ApiError::BadResponse { message, .. }) => message.clone(),
            other => other.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
