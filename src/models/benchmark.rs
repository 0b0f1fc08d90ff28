//! 基准测试触发接口的数据结构

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::provider::Provider;

/// 创建基准测试运行的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRequest {
    /// 数据集名称（qasper, policyqa, squad2）
    pub dataset: String,
    pub split: String,
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub max_docs: Option<u32>,
    #[serde(default)]
    pub max_questions_per_doc: Option<u32>,
    pub filter_unanswerable: bool,
    /// 键为 openai / llamaindex / vision_agent / reducto，未提供时后端回退到环境变量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_keys: Option<BTreeMap<String, String>>,
}

impl BenchmarkRequest {
    pub fn new(dataset: impl Into<String>, providers: Vec<Provider>) -> Self {
        Self {
            dataset: dataset.into(),
            split: "train".to_string(),
            providers,
            max_docs: None,
            max_questions_per_doc: None,
            filter_unanswerable: true,
            api_keys: None,
        }
    }
}

/// 基准测试运行响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResponse {
    pub run_id: String,
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}
