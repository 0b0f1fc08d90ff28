/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 后端 API 地址
    pub api_base_url: String,
    /// 单次请求超时（秒），解析大文件可能需要数分钟
    pub request_timeout_secs: u64,
    /// 反馈提交的最大尝试次数
    pub feedback_max_attempts: usize,
    /// 反馈重试的基础等待时间（毫秒），第 n 次失败后等待 n 倍
    pub feedback_retry_base_delay_ms: u64,
    /// provider 密钥与解析参数的设置文件
    pub settings_file: String,
    /// 批量模式下待处理 PDF 的目录
    pub pdf_folder: String,
    /// 对比结果输出目录
    pub output_dir: String,
    /// 对战反馈记录文件
    pub feedback_log_file: String,
    /// 批量模式下同时处理的文档数量
    pub max_concurrent_documents: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 600,
            feedback_max_attempts: 3,
            feedback_retry_base_delay_ms: 1000,
            settings_file: "ragrace.toml".to_string(),
            pdf_folder: "input_pdfs".to_string(),
            output_dir: "output".to_string(),
            feedback_log_file: "feedback.jsonl".to_string(),
            max_concurrent_documents: 2,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("RAGRACE_API_BASE_URL").unwrap_or(default.api_base_url),
            request_timeout_secs: std::env::var("RAGRACE_REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            feedback_max_attempts: std::env::var("RAGRACE_FEEDBACK_MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.feedback_max_attempts),
            feedback_retry_base_delay_ms: std::env::var("RAGRACE_FEEDBACK_RETRY_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.feedback_retry_base_delay_ms),
            settings_file: std::env::var("RAGRACE_SETTINGS_FILE").unwrap_or(default.settings_file),
            pdf_folder: std::env::var("RAGRACE_PDF_FOLDER").unwrap_or(default.pdf_folder),
            output_dir: std::env::var("RAGRACE_OUTPUT_DIR").unwrap_or(default.output_dir),
            feedback_log_file: std::env::var("RAGRACE_FEEDBACK_LOG").unwrap_or(default.feedback_log_file),
            max_concurrent_documents: std::env::var("RAGRACE_MAX_CONCURRENT_DOCUMENTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_documents),
            verbose_logging: std::env::var("RAGRACE_VERBOSE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 去掉末尾斜杠的 API 地址
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
