//! 多 provider 对比流程 - 流程层
//!
//! 流程顺序：
//! 1. 上传 PDF（或复用已有 file_id）→ 获取页数
//! 2. 逐个 provider 调用对比接口（串行，单个失败不影响其它）
//! 3. 计算费用（失败时改用离线估算）

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::ArenaApi;
use crate::error::{AppResult, BattleError, FileError};
use crate::models::{
    is_pdf, CostComparisonResponse, CostRequest, ParseCompareRequest, Provider,
    ProviderParseResult, ProviderSettings,
};
use crate::services::{CostService, MarkdownService, OutputWriter};
use crate::workflow::battle_ctx::DocumentCtx;

/// 单个 provider 的对比结果，失败时保留错误文本用于内联展示
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    pub provider: Provider,
    pub result: Result<ProviderParseResult, String>,
}

impl ProviderOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// 费用结果
#[derive(Debug, Clone)]
pub enum CostOutcome {
    /// 后端计算
    Backend(CostComparisonResponse),
    /// 后端失败，使用离线估算
    Estimated {
        estimate: CostComparisonResponse,
        error: String,
    },
}

impl CostOutcome {
    pub fn costs(&self) -> &CostComparisonResponse {
        match self {
            CostOutcome::Backend(costs) => costs,
            CostOutcome::Estimated { estimate, .. } => estimate,
        }
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, CostOutcome::Estimated { .. })
    }
}

/// 一次多 provider 对比的完整结果
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub doc: DocumentCtx,
    pub page_number: Option<u32>,
    pub providers: Vec<ProviderOutcome>,
    pub cost: CostOutcome,
}

impl ComparisonOutcome {
    pub fn success_count(&self) -> usize {
        self.providers.iter().filter(|p| p.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Provider, &str)> {
        self.providers
            .iter()
            .filter_map(|p| p.result.as_ref().err().map(|e| (&p.provider, e.as_str())))
    }
}

/// 多 provider 对比流程
pub struct CompareFlow {
    api: Arc<dyn ArenaApi>,
    markdown: MarkdownService,
    cost_service: CostService,
}

impl CompareFlow {
    pub fn new(api: Arc<dyn ArenaApi>) -> Result<Self> {
        Ok(Self {
            api,
            markdown: MarkdownService::new()?,
            cost_service: CostService::new(),
        })
    }

    /// 上传 PDF 并获取页数
    pub async fn upload(&self, pdf_path: &Path) -> AppResult<DocumentCtx> {
        if !is_pdf(pdf_path) {
            return Err(FileError::NotPdf {
                path: pdf_path.display().to_string(),
            }
            .into());
        }
        let uploaded = self.api.upload_pdf(pdf_path).await?;
        let pages = self.api.page_count(&uploaded.file_id).await?;
        Ok(DocumentCtx::new(uploaded.file_id, uploaded.filename, pages.page_count))
    }

    /// 复用已上传的文件
    pub async fn attach(&self, file_id: &str) -> AppResult<DocumentCtx> {
        let pages = self.api.page_count(file_id).await?;
        Ok(DocumentCtx::new(pages.file_id, pages.filename, pages.page_count))
    }

    /// 逐个 provider 对比并计算费用
    ///
    /// `page_number` 为空时解析整份文档。只有页码越界会直接返回错误，
    /// provider 与费用的失败都作为结果的一部分返回。
    pub async fn run(
        &self,
        doc: &DocumentCtx,
        providers: &[Provider],
        settings: &ProviderSettings,
        page_number: Option<u32>,
    ) -> AppResult<ComparisonOutcome> {
        if let Some(page) = page_number {
            if !doc.contains_page(page) {
                return Err(BattleError::PageOutOfRange {
                    page,
                    page_count: doc.page_count,
                }
                .into());
            }
        }

        let mut outcomes = Vec::with_capacity(providers.len());
        for &provider in providers {
            info!("{} 🔍 {} 解析中...", doc, provider.display_name());
            let result = self.compare_one(doc, provider, settings, page_number).await;
            match &result {
                Ok(parsed) => info!(
                    "{} ✓ {} 完成: {} 页, 耗时 {:.1}s",
                    doc,
                    provider.display_name(),
                    parsed.pages.len(),
                    parsed.processing_time
                ),
                Err(e) => warn!("{} ⚠️ {} 失败: {}", doc, provider.display_name(), e),
            }
            outcomes.push(ProviderOutcome { provider, result });
        }

        let cost = self.cost(doc, providers, settings, page_number).await;

        Ok(ComparisonOutcome {
            doc: doc.clone(),
            page_number,
            providers: outcomes,
            cost,
        })
    }

    async fn compare_one(
        &self,
        doc: &DocumentCtx,
        provider: Provider,
        settings: &ProviderSettings,
        page_number: Option<u32>,
    ) -> Result<ProviderParseResult, String> {
        let api_key = settings.api_key(provider).map_err(|e| e.to_string())?;

        let request = ParseCompareRequest {
            file_id: doc.file_id.clone(),
            providers: vec![provider],
            api_keys: [(provider.as_str().to_string(), api_key.to_string())]
                .into_iter()
                .collect(),
            configs: settings.configs_for(&[provider]),
            page_number,
            battle_mode: false,
        };

        let mut response = self
            .api
            .compare(&request)
            .await
            .map_err(|e| e.user_message())?;

        response
            .results
            .remove(provider.as_str())
            .ok_or_else(|| format!("响应中缺少 {} 的结果", provider.display_name()))
    }

    async fn cost(
        &self,
        doc: &DocumentCtx,
        providers: &[Provider],
        settings: &ProviderSettings,
        page_number: Option<u32>,
    ) -> CostOutcome {
        let request = CostRequest {
            file_id: doc.file_id.clone(),
            providers: providers.to_vec(),
            configs: settings.configs_for(providers),
        };

        match self.api.calculate_cost(&request).await {
            Ok(costs) => CostOutcome::Backend(costs),
            Err(e) => {
                let pages = if page_number.is_some() { 1 } else { doc.page_count };
                warn!("{} ⚠️ 费用计算失败，使用离线估算: {}", doc, e);
                CostOutcome::Estimated {
                    estimate: self
                        .cost_service
                        .estimate_all(&doc.file_id, providers, settings, pages),
                    error: e.user_message(),
                }
            }
        }
    }

    /// 生成单个 provider 的 markdown 报告
    pub fn render(&self, outcome: &ProviderOutcome) -> String {
        let title = outcome.provider.display_name();
        match &outcome.result {
            Ok(parsed) => self
                .markdown
                .render_report(title, outcome.provider.as_str(), parsed),
            Err(e) => format!("# {}\n\n> ❌ {}\n", title, e),
        }
    }

    /// 把对比结果写入输出目录
    pub async fn save(&self, outcome: &ComparisonOutcome, writer: &OutputWriter) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for provider in &outcome.providers {
            let report = self.render(provider);
            written.push(
                writer
                    .write_markdown(&outcome.doc.filename, provider.provider.as_str(), &report)
                    .await?,
            );
        }
        written.push(
            writer
                .write_cost(&outcome.doc.filename, outcome.cost.costs())
                .await?,
        );
        Ok(written)
    }

    pub fn cost_service(&self) -> &CostService {
        &self.cost_service
    }
}
