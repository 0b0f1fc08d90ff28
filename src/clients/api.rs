//! 后端 API 抽象
//!
//! 流程层只依赖这个 trait，测试时可以替换为内存实现。

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use crate::error::AppResult;
use crate::models::{
    BenchmarkRequest, BenchmarkResponse, CostComparisonResponse, CostRequest, DatasetInfo,
    DatasetPerformanceSummary, FeedbackRequest, FeedbackResponse, PageCountResponse,
    ParseCompareRequest, ParseCompareResponse, ProviderDetailResponse, ResultsListResponse,
    RunDetail, UploadResponse,
};

/// RAGRace 后端提供的全部能力
#[async_trait]
pub trait ArenaApi: Send + Sync {
    /// 健康检查
    async fn health(&self) -> AppResult<Value>;

    /// 上传 PDF
    async fn upload_pdf(&self, pdf_path: &Path) -> AppResult<UploadResponse>;

    /// 获取已上传 PDF 的页数
    async fn page_count(&self, file_id: &str) -> AppResult<PageCountResponse>;

    /// 调用对比接口（对战模式也走这里）
    async fn compare(&self, request: &ParseCompareRequest) -> AppResult<ParseCompareResponse>;

    /// 计算解析费用
    async fn calculate_cost(&self, request: &CostRequest) -> AppResult<CostComparisonResponse>;

    /// 提交对战反馈，返回揭晓后的标签归属
    async fn submit_feedback(&self, request: &FeedbackRequest) -> AppResult<FeedbackResponse>;

    /// 列出已完成的基准测试运行
    async fn list_results(
        &self,
        dataset: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> AppResult<ResultsListResponse>;

    /// 获取单次运行详情
    async fn get_run(&self, run_id: &str) -> AppResult<RunDetail>;

    /// 列出数据集
    async fn list_datasets(&self) -> AppResult<Vec<DatasetInfo>>;

    /// 数据集上所有文档的最新结果（结构与 RunDetail 相同）
    async fn dataset_documents(&self, dataset: &str) -> AppResult<RunDetail>;

    /// 数据集上各 provider 的聚合表现
    async fn dataset_performance(&self, dataset: &str) -> AppResult<DatasetPerformanceSummary>;

    /// 单个 provider 在数据集上的明细
    async fn provider_detail(
        &self,
        dataset: &str,
        provider: &str,
    ) -> AppResult<ProviderDetailResponse>;

    /// 触发一次基准测试（同步执行，可能耗时数分钟）
    async fn run_benchmark(&self, request: &BenchmarkRequest) -> AppResult<BenchmarkResponse>;
}
