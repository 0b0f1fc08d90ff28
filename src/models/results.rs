//! 基准测试结果与数据集表现的数据结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 基准测试运行摘要（列表视图）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub dataset: String,
    pub split: String,
    pub providers: Vec<String>,
    pub status: String,
    pub num_docs: u32,
    pub num_questions: u32,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

/// 单个问题的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub question: String,
    pub ground_truth: String,
    pub response_answer: String,
    #[serde(default)]
    pub response_context: Vec<String>,
    #[serde(default)]
    pub response_latency_ms: Option<f64>,
    #[serde(default)]
    pub evaluation_scores: BTreeMap<String, Value>,
}

/// provider 在某个文档上的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub aggregated_scores: BTreeMap<String, Value>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub questions: Vec<QuestionResult>,
}

impl ProviderResult {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// 文档及各 provider 的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    pub doc_id: String,
    pub doc_title: String,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderResult>,
}

/// 运行详情
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDetail {
    pub run_id: String,
    pub dataset: String,
    pub split: String,
    pub providers: Vec<String>,
    pub status: String,
    pub num_docs: u32,
    pub num_questions: u32,
    #[serde(default)]
    pub config: BTreeMap<String, Value>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentResult>,
}

/// 数据集信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub available_splits: Vec<String>,
    #[serde(default)]
    pub num_documents: Option<u32>,
    pub task_type: String,
}

/// 运行列表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsListResponse {
    pub runs: Vec<RunSummary>,
    pub total: u32,
    pub limit: u32,
    pub offset: u32,
}

/// provider 在数据集上的聚合表现
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPerformance {
    pub provider: String,
    pub num_documents: u32,
    pub num_runs: u32,
    #[serde(default)]
    pub aggregated_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub avg_duration_seconds: Option<f64>,
}

/// 数据集表现汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetPerformanceSummary {
    pub dataset_name: String,
    pub total_runs: u32,
    pub total_documents: u32,
    #[serde(default)]
    pub providers: Vec<ProviderPerformance>,
    #[serde(default)]
    pub last_run_date: Option<DateTime<Utc>>,
}

/// provider 在单个文档上的明细
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDocumentDetail {
    pub doc_id: String,
    pub doc_title: String,
    pub run_id: String,
    pub run_date: DateTime<Utc>,
    #[serde(default)]
    pub aggregated_scores: BTreeMap<String, Value>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    pub status: String,
}

/// provider 在数据集上的详细结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDetailResponse {
    pub dataset_name: String,
    pub provider: String,
    pub total_documents: u32,
    pub total_runs: u32,
    #[serde(default)]
    pub overall_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub documents: Vec<ProviderDocumentDetail>,
}
