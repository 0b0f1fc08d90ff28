/// RAGRace 后端 API 客户端
///
/// 封装所有与后端 REST API 相关的调用逻辑
use crate::clients::api::ArenaApi;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, ConfigError, FileError};
use crate::models::{
    is_pdf, BenchmarkRequest, BenchmarkResponse, CostComparisonResponse, CostRequest,
    DatasetInfo, DatasetPerformanceSummary, FeedbackRequest, FeedbackResponse,
    PageCountRequest, PageCountResponse, ParseCompareRequest, ParseCompareResponse,
    ProviderDetailResponse, ResultsListResponse, RunDetail, UploadResponse,
};
use async_trait::async_trait;
use reqwest::{multipart, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// 后端 API 客户端
pub struct RagRaceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RagRaceClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let base_url = Url::parse(config.base_url()).map_err(|e| ConfigError::InvalidValue {
            name: "api_base_url".to_string(),
            value: config.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                name: "api_base_url".to_string(),
                value: config.api_base_url.clone(),
                reason: "不是合法的 HTTP 地址".to_string(),
            }
            .into());
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed("client", e))?;

        Ok(Self { http, base_url })
    }

    /// 拼接 URL，路径片段会被正确转义
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    /// 用于错误信息的接口路径
    fn endpoint(segments: &[&str]) -> String {
        format!("/{}", segments.join("/"))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let endpoint = Self::endpoint(segments);
        debug!("GET {}", endpoint);

        let response = self
            .http
            .get(self.url(segments))
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        Self::read_json(&endpoint, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> AppResult<T> {
        let endpoint = Self::endpoint(segments);
        debug!("POST {}", endpoint);

        let response = self
            .http
            .post(self.url(segments))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        Self::read_json(&endpoint, response).await
    }

    /// 检查状态码并解析响应体
    async fn read_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        if !status.is_success() {
            let message = extract_detail(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            debug!("{} 返回 {}: {}", endpoint, status.as_u16(), message);
            return Err(AppError::bad_response(endpoint, status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            AppError::Api(ApiError::JsonParseFailed {
                endpoint: endpoint.to_string(),
                source: e,
            })
        })
    }
}

/// 提取 FastAPI 风格的错误信息
///
/// `detail` 可能是字符串，也可能是校验错误数组；非 JSON 响应体原样返回。
pub fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => match json.get("detail") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(trimmed.to_string()),
        },
        Err(_) => Some(trimmed.to_string()),
    }
}

#[async_trait]
impl ArenaApi for RagRaceClient {
    async fn health(&self) -> AppResult<Value> {
        self.get_json(&["api", "health"], &[]).await
    }

    async fn upload_pdf(&self, pdf_path: &Path) -> AppResult<UploadResponse> {
        let endpoint = "/api/v1/parse/upload";
        let path_str = pdf_path.display().to_string();
        if !is_pdf(pdf_path) {
            return Err(AppError::File(FileError::NotPdf { path: path_str }));
        }

        let bytes = tokio::fs::read(pdf_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::File(FileError::NotFound { path: path_str.clone() })
            } else {
                AppError::file_read_failed(&path_str, e)
            }
        })?;

        let filename = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document.pdf".to_string());

        debug!("上传 {} ({} 字节)", filename, bytes.len());

        let part = multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str("application/pdf")
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url(&["api", "v1", "parse", "upload"]))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        Self::read_json(endpoint, response).await
    }

    async fn page_count(&self, file_id: &str) -> AppResult<PageCountResponse> {
        let request = PageCountRequest {
            file_id: file_id.to_string(),
        };
        self.post_json(&["api", "v1", "parse", "page-count"], &request)
            .await
    }

    async fn compare(&self, request: &ParseCompareRequest) -> AppResult<ParseCompareResponse> {
        self.post_json(&["api", "v1", "parse", "compare"], request)
            .await
    }

    async fn calculate_cost(&self, request: &CostRequest) -> AppResult<CostComparisonResponse> {
        self.post_json(&["api", "v1", "parse", "calculate-cost"], request)
            .await
    }

    async fn submit_feedback(&self, request: &FeedbackRequest) -> AppResult<FeedbackResponse> {
        self.post_json(&["api", "v1", "parse", "battle-feedback"], request)
            .await
    }

    async fn list_results(
        &self,
        dataset: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> AppResult<ResultsListResponse> {
        let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(dataset) = dataset {
            query.push(("dataset", dataset.to_string()));
        }
        self.get_json(&["api", "v1", "results"], &query).await
    }

    async fn get_run(&self, run_id: &str) -> AppResult<RunDetail> {
        self.get_json(&["api", "v1", "results", run_id], &[]).await
    }

    async fn list_datasets(&self) -> AppResult<Vec<DatasetInfo>> {
        self.get_json(&["api", "v1", "datasets"], &[]).await
    }

    async fn dataset_documents(&self, dataset: &str) -> AppResult<RunDetail> {
        self.get_json(&["api", "v1", "datasets", dataset, "documents"], &[])
            .await
    }

    async fn dataset_performance(&self, dataset: &str) -> AppResult<DatasetPerformanceSummary> {
        self.get_json(&["api", "v1", "datasets", dataset, "performance"], &[])
            .await
    }

    async fn provider_detail(
        &self,
        dataset: &str,
        provider: &str,
    ) -> AppResult<ProviderDetailResponse> {
        self.get_json(
            &["api", "v1", "datasets", dataset, "providers", provider],
            &[],
        )
        .await
    }

    async fn run_benchmark(&self, request: &BenchmarkRequest) -> AppResult<BenchmarkResponse> {
        self.post_json(&["api", "v1", "benchmarks"], request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client(base: &str) -> RagRaceClient {
        let config = Config {
            api_base_url: base.to_string(),
            ..Config::default()
        };
        RagRaceClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_escapes_segments() {
        let client = create_test_client("http://localhost:8000");
        let url = client.url(&["api", "v1", "results", "run 1/2"]);
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/results/run%201%2F2");
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let client = create_test_client("http://example.com/ragrace/");
        let url = client.url(&["api", "health"]);
        assert_eq!(url.as_str(), "http://example.com/ragrace/api/health");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = Config {
            api_base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            RagRaceClient::new(&config),
            Err(AppError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf_before_request() {
        let client = create_test_client("http://127.0.0.1:9");
        let err = client.upload_pdf(Path::new("notes.txt")).await.unwrap_err();
        assert!(matches!(err, AppError::File(FileError::NotPdf { .. })));
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(
            extract_detail(r#"{"detail": "Battle run not found"}"#).as_deref(),
            Some("Battle run not found")
        );
        assert_eq!(
            extract_detail(r#"{"detail": [{"loc": ["body", "file_id"]}]}"#).as_deref(),
            Some(r#"[{"loc":["body","file_id"]}]"#)
        );
        assert_eq!(extract_detail("Internal Server Error").as_deref(), Some("Internal Server Error"));
        assert_eq!(extract_detail("  "), None);
    }

    /// 测试后端连通性
    ///
    /// 运行方式：
    /// ```bash
    /// cargo test test_health_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_health_live() {
        let _ = tracing_subscriber::fmt::try_init();
        let client = RagRaceClient::new(&Config::from_env()).unwrap();
        let health = client.health().await.expect("后端不可用");
        println!("health: {}", health);
        assert_eq!(health["status"], "ok");
    }
}
