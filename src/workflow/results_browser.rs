//! 结果浏览流程 - 流程层
//!
//! 基准测试运行、数据集与 provider 表现的查询，以及触发新的基准测试

use std::sync::Arc;
use tracing::info;

use crate::clients::ArenaApi;
use crate::error::{AppResult, ConfigError};
use crate::models::{
    BenchmarkRequest, BenchmarkResponse, DatasetInfo, DatasetPerformanceSummary,
    ProviderDetailResponse, ProviderPerformance, ProviderSettings, RunDetail, RunSummary,
};
use crate::services::PerformanceService;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 一页运行列表
#[derive(Debug, Clone)]
pub struct ResultsPage {
    pub runs: Vec<RunSummary>,
    pub total: u32,
    pub limit: u32,
    pub offset: u32,
}

impl ResultsPage {
    pub fn has_more(&self) -> bool {
        self.offset + (self.runs.len() as u32) < self.total
    }

    /// 下一页的 offset，没有下一页时返回 None
    pub fn next_offset(&self) -> Option<u32> {
        self.has_more().then(|| self.offset + self.runs.len() as u32)
    }
}

/// limit 必须在 [1, 100] 内
pub fn validate_limit(limit: u32) -> Result<u32, ConfigError> {
    if (1..=MAX_PAGE_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(ConfigError::InvalidValue {
            name: "limit".to_string(),
            value: limit.to_string(),
            reason: format!("必须在 1 到 {} 之间", MAX_PAGE_LIMIT),
        })
    }
}

pub struct ResultsBrowser {
    api: Arc<dyn ArenaApi>,
    performance: PerformanceService,
}

impl ResultsBrowser {
    pub fn new(api: Arc<dyn ArenaApi>) -> Self {
        Self {
            api,
            performance: PerformanceService::new(),
        }
    }

    /// 列出运行记录，limit 越界时在本地拒绝
    pub async fn list_runs(&self, dataset: Option<&str>, limit: u32, offset: u32) -> AppResult<ResultsPage> {
        let limit = validate_limit(limit)?;
        let response = self.api.list_results(dataset, limit, offset).await?;
        Ok(ResultsPage {
            runs: response.runs,
            total: response.total,
            limit: response.limit,
            offset: response.offset,
        })
    }

    pub async fn run_detail(&self, run_id: &str) -> AppResult<RunDetail> {
        self.api.get_run(run_id).await
    }

    pub async fn datasets(&self) -> AppResult<Vec<DatasetInfo>> {
        self.api.list_datasets().await
    }

    pub async fn dataset_documents(&self, dataset: &str) -> AppResult<RunDetail> {
        self.api.dataset_documents(dataset).await
    }

    pub async fn dataset_performance(&self, dataset: &str) -> AppResult<DatasetPerformanceSummary> {
        self.api.dataset_performance(dataset).await
    }

    /// 按指标排名；未指定指标时取汇总中的第一个指标
    pub fn ranking<'a>(
        &self,
        summary: &'a DatasetPerformanceSummary,
        metric: Option<&str>,
    ) -> (Option<String>, Vec<&'a ProviderPerformance>) {
        let metric = metric
            .map(str::to_string)
            .or_else(|| self.performance.metric_names(summary).into_iter().next());
        let Some(metric) = metric else {
            return (None, summary.providers.iter().collect());
        };
        let ranked = self.performance.rank_providers(&summary.providers, &metric);
        (Some(metric), ranked)
    }

    pub async fn provider_detail(&self, dataset: &str, provider: &str) -> AppResult<ProviderDetailResponse> {
        self.api.provider_detail(dataset, provider).await
    }

    /// 触发基准测试，请求中未带 api_keys 时从设置文件补齐
    pub async fn run_benchmark(
        &self,
        mut request: BenchmarkRequest,
        settings: &ProviderSettings,
    ) -> AppResult<BenchmarkResponse> {
        if request.api_keys.is_none() {
            request.api_keys = settings.benchmark_api_keys();
        }
        info!(
            "🏁 开始基准测试: {} ({}) providers={:?}",
            request.dataset, request.split, request.providers
        );
        let response = self.api.run_benchmark(&request).await?;
        info!("✓ 基准测试 {} 状态: {}", response.run_id, response.status);
        Ok(response)
    }

    pub fn performance(&self) -> &PerformanceService {
        &self.performance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_limit_bounds() {
        assert!(validate_limit(0).is_err());
        assert_eq!(validate_limit(1).unwrap(), 1);
        assert_eq!(validate_limit(100).unwrap(), 100);
        assert!(validate_limit(101).is_err());
    }

    #[test]
    fn test_results_page_next_offset() {
        let page = ResultsPage {
            runs: Vec::new(),
            total: 0,
            limit: 20,
            offset: 0,
        };
        assert!(!page.has_more());
        assert_eq!(page.next_offset(), None);
    }
}
