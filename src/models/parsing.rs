//! PDF 解析与对比接口的数据结构

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::battle::BattleMetadata;
use super::provider::Provider;

/// 上传响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCountRequest {
    pub file_id: String,
}

/// 页数响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCountResponse {
    pub file_id: String,
    pub page_count: u32,
    pub filename: String,
}

/// 单页解析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageData {
    pub page_number: u32,
    pub markdown: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

/// 单个 provider 的解析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderParseResult {
    pub total_pages: u32,
    pub pages: Vec<PageData>,
    pub processing_time: f64,
    #[serde(default)]
    pub usage: BTreeMap<String, Value>,
}

impl ProviderParseResult {
    /// 按页码查找
    pub fn page(&self, page_number: u32) -> Option<&PageData> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }
}

/// 对比请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseCompareRequest {
    pub file_id: String,
    pub providers: Vec<Provider>,
    pub api_keys: BTreeMap<String, String>,
    #[serde(default)]
    pub configs: BTreeMap<String, Value>,
    /// 只解析指定页（从 1 开始），为空时解析整份文档
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// 对战模式：后端会分配匿名标签并返回 battle_metadata
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub battle_mode: bool,
}

/// 对比响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseCompareResponse {
    pub file_id: String,
    pub results: BTreeMap<String, ProviderParseResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battle_metadata: Option<BattleMetadata>,
}

/// 费用计算请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRequest {
    pub file_id: String,
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub configs: BTreeMap<String, Value>,
}

/// 单个 provider 的费用明细
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderCost {
    pub provider: String,
    pub credits: f64,
    pub usd_per_credit: f64,
    pub total_usd: f64,
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
}

/// 所有 provider 的费用对比
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostComparisonResponse {
    pub file_id: String,
    pub costs: BTreeMap<String, ProviderCost>,
    pub total_usd: f64,
}
