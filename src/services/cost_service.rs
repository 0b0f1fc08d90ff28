//! 费用服务 - 业务能力层
//!
//! 负责费用排序、单页费用换算，以及后端不可用时的离线估算

use serde_json::json;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{CostComparisonResponse, Provider, ProviderCost, ProviderSettings};

/// 内置的每 credit 美元价格
///
/// 按各 provider 公开价目表折算的假设值，后端不返回价格时才使用；
/// 设置文件的 `[usd_per_credit]` 可覆盖。
pub fn default_usd_per_credit(provider: Provider) -> f64 {
    match provider {
        Provider::LlamaIndex => 0.001,
        Provider::Reducto => 0.015,
        Provider::LandingAI => 0.01,
    }
}

/// 每 credit 的美元价格，优先取设置文件中的值
pub fn usd_per_credit(provider: Provider, settings: &ProviderSettings) -> f64 {
    settings
        .usd_per_credit
        .get(provider.as_str())
        .copied()
        .filter(|rate| rate.is_finite() && *rate >= 0.0)
        .unwrap_or_else(|| default_usd_per_credit(provider))
}

/// 按当前解析参数计算每页消耗的 credit
pub fn credits_per_page(provider: Provider, settings: &ProviderSettings) -> f64 {
    match provider {
        Provider::LlamaIndex => match settings.llamaindex.parse_mode.as_str() {
            "parse_page_with_agent" => 10.0,
            "parse_page_with_llm" => 3.0,
            _ => 1.0,
        },
        Provider::Reducto => {
            if settings.reducto.mode == "complex" {
                2.0
            } else {
                1.0
            }
        }
        Provider::LandingAI => 3.0,
    }
}

/// 费用服务
#[derive(Debug, Default)]
pub struct CostService;

impl CostService {
    pub fn new() -> Self {
        Self
    }

    /// 按总价升序排列，价格相同时按 provider 名称
    pub fn rank_by_cost<'a>(&self, costs: &'a CostComparisonResponse) -> Vec<&'a ProviderCost> {
        let mut ranked: Vec<&ProviderCost> = costs.costs.values().collect();
        ranked.sort_by(|a, b| {
            a.total_usd
                .partial_cmp(&b.total_usd)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.provider.cmp(&b.provider))
        });
        ranked
    }

    /// 最便宜的 provider
    pub fn cheapest<'a>(&self, costs: &'a CostComparisonResponse) -> Option<&'a ProviderCost> {
        self.rank_by_cost(costs).into_iter().next()
    }

    /// 每页美元费用，页数为 0 时返回 None
    pub fn usd_per_page(&self, cost: &ProviderCost, pages: u32) -> Option<f64> {
        if pages == 0 {
            None
        } else {
            Some(cost.total_usd / pages as f64)
        }
    }

    /// 离线估算单个 provider 的费用
    pub fn estimate(&self, provider: Provider, settings: &ProviderSettings, pages: u32) -> ProviderCost {
        let per_page = credits_per_page(provider, settings);
        let credits = per_page * pages as f64;
        let rate = usd_per_credit(provider, settings);

        let mut details = BTreeMap::new();
        details.insert("num_pages".to_string(), json!(pages));
        details.insert("credits_per_page".to_string(), json!(per_page));
        details.insert("estimated".to_string(), json!(true));

        ProviderCost {
            provider: provider.as_str().to_string(),
            credits,
            usd_per_credit: rate,
            total_usd: credits * rate,
            details,
        }
    }

    /// 离线估算所有 provider 的费用
    pub fn estimate_all(
        &self,
        file_id: &str,
        providers: &[Provider],
        settings: &ProviderSettings,
        pages: u32,
    ) -> CostComparisonResponse {
        let costs: BTreeMap<String, ProviderCost> = providers
            .iter()
            .map(|p| (p.as_str().to_string(), self.estimate(*p, settings, pages)))
            .collect();
        let total_usd = costs.values().map(|c| c.total_usd).sum();

        CostComparisonResponse {
            file_id: file_id.to_string(),
            costs,
            total_usd,
        }
    }

    /// 美元金额格式化
    pub fn format_usd(&self, amount: f64) -> String {
        format!("${:.4}", amount)
    }
}
