//! 测试用的内存后端

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use ragrace_arena::error::{AppError, AppResult};
use ragrace_arena::models::{
    BattleAssignment, BattleMetadata, BenchmarkRequest, BenchmarkResponse, CostComparisonResponse,
    CostRequest, DatasetInfo, DatasetPerformanceSummary, FeedbackRequest, FeedbackResponse,
    PageCountResponse, PageData, ParseCompareRequest, ParseCompareResponse, ProviderCost,
    ProviderDetailResponse, ProviderParseResult, ProviderSettings, ResultsListResponse, RunDetail,
    UploadResponse,
};
use ragrace_arena::{ArenaApi, Config};

pub const FILE_ID: &str = "file-1";
pub const BATTLE_ID: &str = "battle-1";

/// 内存中的 RAGRace 后端
#[derive(Debug)]
pub struct FakeArena {
    pub page_count: u32,
    /// 对战分配的标签
    pub labels: Mutex<Vec<String>>,
    /// 前 N 次提交反馈返回 "Battle run not found"
    pub feedback_not_found: Mutex<usize>,
    /// 提交反馈总是返回的其它错误
    pub feedback_error: Mutex<Option<(u16, String)>>,
    /// 揭晓时返回的归属，为空时使用对战分配
    pub reveal_override: Mutex<Option<Vec<BattleAssignment>>>,
    /// 对比接口对这些 provider 返回错误
    pub failing_providers: Mutex<Vec<String>>,
    pub cost_fails: Mutex<bool>,
    pub total_runs: u32,

    pub calls: Mutex<Vec<String>>,
    pub compare_requests: Mutex<Vec<ParseCompareRequest>>,
    pub feedback_requests: Mutex<Vec<FeedbackRequest>>,
    pub benchmark_requests: Mutex<Vec<BenchmarkRequest>>,
    assignments: Mutex<Vec<BattleAssignment>>,
}

impl Default for FakeArena {
    fn default() -> Self {
        Self {
            page_count: 3,
            labels: Mutex::new(vec!["A".to_string(), "B".to_string()]),
            feedback_not_found: Mutex::new(0),
            feedback_error: Mutex::new(None),
            reveal_override: Mutex::new(None),
            failing_providers: Mutex::new(Vec::new()),
            cost_fails: Mutex::new(false),
            total_runs: 45,
            calls: Mutex::new(Vec::new()),
            compare_requests: Mutex::new(Vec::new()),
            feedback_requests: Mutex::new(Vec::new()),
            benchmark_requests: Mutex::new(Vec::new()),
            assignments: Mutex::new(Vec::new()),
        }
    }
}

impl FakeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn parse_result(&self, provider_index: usize, pages: &[u32]) -> ProviderParseResult {
        ProviderParseResult {
            total_pages: self.page_count,
            pages: pages
                .iter()
                .map(|&n| PageData {
                    page_number: n,
                    markdown: format!("  output {} page {}  ", provider_index + 1, n),
                    images: Vec::new(),
                    metadata: BTreeMap::new(),
                })
                .collect(),
            processing_time: 1.5,
            usage: BTreeMap::new(),
        }
    }
}

/// 配齐三家 API key 的设置
pub fn settings_with_keys() -> ProviderSettings {
    let mut settings = ProviderSettings::default();
    for (name, key) in [
        ("llamaindex", "llx-test"),
        ("reducto", "rd-test"),
        ("landingai", "la-test"),
        ("openai", "sk-test"),
    ] {
        settings.api_keys.insert(name.to_string(), key.to_string());
    }
    settings
}

/// 反馈重试间隔较短、不写反馈记录的配置
pub fn test_config() -> Config {
    Config {
        feedback_retry_base_delay_ms: 100,
        ..Config::default()
    }
}

fn run_detail(run_id: &str, dataset: &str) -> RunDetail {
    serde_json::from_value(json!({
        "run_id": run_id,
        "dataset": dataset,
        "split": "train",
        "providers": ["llamaindex", "reducto"],
        "status": "completed",
        "num_docs": 1,
        "num_questions": 2,
        "documents": [{
            "doc_id": "d1",
            "doc_title": "Doc 1",
            "providers": {
                "llamaindex": {"provider": "llamaindex", "status": "success",
                               "aggregated_scores": {"faithfulness": 0.9}, "duration_seconds": 12.0},
                "reducto": {"provider": "reducto", "status": "error", "error": "timeout"}
            }
        }]
    }))
    .unwrap()
}

#[async_trait]
impl ArenaApi for FakeArena {
    async fn health(&self) -> AppResult<Value> {
        self.record("health");
        Ok(json!({"status": "healthy", "service": "ragrace"}))
    }

    async fn upload_pdf(&self, pdf_path: &Path) -> AppResult<UploadResponse> {
        self.record("upload");
        Ok(UploadResponse {
            file_id: FILE_ID.to_string(),
            filename: pdf_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        })
    }

    async fn page_count(&self, file_id: &str) -> AppResult<PageCountResponse> {
        self.record("page_count");
        Ok(PageCountResponse {
            file_id: file_id.to_string(),
            page_count: self.page_count,
            filename: "paper.pdf".to_string(),
        })
    }

    async fn compare(&self, request: &ParseCompareRequest) -> AppResult<ParseCompareResponse> {
        self.compare_requests.lock().unwrap().push(request.clone());
        let pages: Vec<u32> = match request.page_number {
            Some(n) => vec![n],
            None => (1..=self.page_count).collect(),
        };

        if request.battle_mode {
            self.record("compare:battle");
            let labels = self.labels.lock().unwrap().clone();
            let assignments: Vec<BattleAssignment> = labels
                .iter()
                .zip(request.providers.iter())
                .map(|(label, provider)| BattleAssignment {
                    label: label.clone(),
                    provider: provider.as_str().to_string(),
                })
                .collect();
            *self.assignments.lock().unwrap() = assignments.clone();

            let results = assignments
                .iter()
                .enumerate()
                .map(|(i, a)| (a.provider.clone(), self.parse_result(i, &pages)))
                .collect();
            return Ok(ParseCompareResponse {
                file_id: request.file_id.clone(),
                results,
                battle_metadata: Some(BattleMetadata {
                    battle_id: BATTLE_ID.to_string(),
                    page_number: request.page_number,
                    assignments,
                }),
            });
        }

        let mut results = BTreeMap::new();
        for (i, provider) in request.providers.iter().enumerate() {
            self.record(format!("compare:{}", provider.as_str()));
            if self
                .failing_providers
                .lock()
                .unwrap()
                .iter()
                .any(|p| p == provider.as_str())
            {
                return Err(AppError::bad_response(
                    "/api/v1/parse/compare",
                    500,
                    format!("{} parsing failed", provider.as_str()),
                ));
            }
            results.insert(provider.as_str().to_string(), self.parse_result(i, &pages));
        }
        Ok(ParseCompareResponse {
            file_id: request.file_id.clone(),
            results,
            battle_metadata: None,
        })
    }

    async fn calculate_cost(&self, request: &CostRequest) -> AppResult<CostComparisonResponse> {
        self.record("cost");
        if *self.cost_fails.lock().unwrap() {
            return Err(AppError::bad_response("/api/v1/parse/calculate-cost", 503, "cost service down"));
        }
        let costs: BTreeMap<String, ProviderCost> = request
            .providers
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let total = 0.3 - 0.1 * i as f64;
                (
                    p.as_str().to_string(),
                    ProviderCost {
                        provider: p.as_str().to_string(),
                        credits: total * 100.0,
                        usd_per_credit: 0.01,
                        total_usd: total,
                        details: BTreeMap::new(),
                    },
                )
            })
            .collect();
        let total_usd = costs.values().map(|c| c.total_usd).sum();
        Ok(CostComparisonResponse {
            file_id: request.file_id.clone(),
            costs,
            total_usd,
        })
    }

    async fn submit_feedback(&self, request: &FeedbackRequest) -> AppResult<FeedbackResponse> {
        self.record("feedback");
        self.feedback_requests.lock().unwrap().push(request.clone());

        {
            let mut remaining = self.feedback_not_found.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AppError::bad_response(
                    "/api/v1/parse/battle-feedback",
                    404,
                    "Battle run not found",
                ));
            }
        }
        if let Some((status, message)) = self.feedback_error.lock().unwrap().clone() {
            return Err(AppError::bad_response("/api/v1/parse/battle-feedback", status, message));
        }

        let assignments = self
            .reveal_override
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| self.assignments.lock().unwrap().clone());
        Ok(FeedbackResponse {
            battle_id: request.battle_id.clone(),
            assignments,
            message: Some("Feedback recorded".to_string()),
        })
    }

    async fn list_results(
        &self,
        dataset: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> AppResult<ResultsListResponse> {
        self.record("list_results");
        let end = (offset + limit).min(self.total_runs);
        let runs = (offset..end)
            .map(|i| {
                serde_json::from_value(json!({
                    "run_id": format!("run_{:03}", i),
                    "dataset": dataset.unwrap_or("qasper"),
                    "split": "train",
                    "providers": ["llamaindex"],
                    "status": "completed",
                    "num_docs": 1,
                    "num_questions": 3,
                    "started_at": "2025-10-30T16:31:37Z"
                }))
                .unwrap()
            })
            .collect();
        Ok(ResultsListResponse {
            runs,
            total: self.total_runs,
            limit,
            offset,
        })
    }

    async fn get_run(&self, run_id: &str) -> AppResult<RunDetail> {
        self.record("get_run");
        if run_id == "missing" {
            return Err(AppError::bad_response("/api/v1/results/missing", 404, "Run missing not found"));
        }
        Ok(run_detail(run_id, "qasper"))
    }

    async fn list_datasets(&self) -> AppResult<Vec<DatasetInfo>> {
        self.record("list_datasets");
        Ok(vec![serde_json::from_value(json!({
            "name": "qasper",
            "display_name": "QASPER",
            "description": "Scientific papers",
            "available_splits": ["train", "validation"],
            "task_type": "qa"
        }))
        .unwrap()])
    }

    async fn dataset_documents(&self, dataset: &str) -> AppResult<RunDetail> {
        self.record("dataset_documents");
        Ok(run_detail("aggregated", dataset))
    }

    async fn dataset_performance(&self, dataset: &str) -> AppResult<DatasetPerformanceSummary> {
        self.record("dataset_performance");
        Ok(serde_json::from_value(json!({
            "dataset_name": dataset,
            "total_runs": 3,
            "total_documents": 10,
            "providers": [
                {"provider": "reducto", "num_documents": 10, "num_runs": 3,
                 "aggregated_scores": {"context_recall": 0.6, "faithfulness": 0.8}},
                {"provider": "landingai", "num_documents": 10, "num_runs": 3,
                 "aggregated_scores": {"faithfulness": 0.85}},
                {"provider": "llamaindex", "num_documents": 10, "num_runs": 3,
                 "aggregated_scores": {"context_recall": 0.7, "faithfulness": 0.75}}
            ]
        }))
        .unwrap())
    }

    async fn provider_detail(&self, dataset: &str, provider: &str) -> AppResult<ProviderDetailResponse> {
        self.record("provider_detail");
        Ok(serde_json::from_value(json!({
            "dataset_name": dataset,
            "provider": provider,
            "total_documents": 1,
            "total_runs": 1,
            "overall_scores": {"faithfulness": 0.9},
            "documents": []
        }))
        .unwrap())
    }

    async fn run_benchmark(&self, request: &BenchmarkRequest) -> AppResult<BenchmarkResponse> {
        self.record("benchmark");
        self.benchmark_requests.lock().unwrap().push(request.clone());
        Ok(BenchmarkResponse {
            run_id: "run_new".to_string(),
            status: "completed".to_string(),
            message: format!("Benchmark completed on {}", request.dataset),
            duration_seconds: Some(12.0),
        })
    }
}
