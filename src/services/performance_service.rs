//! 表现服务 - 业务能力层
//!
//! 负责指标汇总与 provider 排名，数据全部来自后端返回的记录

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{DatasetPerformanceSummary, ProviderPerformance, RunDetail};

/// 把 JSON 分数转换为数值，非数值返回 None
pub fn score_of(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// 表现服务
#[derive(Debug, Default)]
pub struct PerformanceService;

impl PerformanceService {
    pub fn new() -> Self {
        Self
    }

    /// 汇总中出现过的所有指标名（排序去重）
    pub fn metric_names(&self, summary: &DatasetPerformanceSummary) -> Vec<String> {
        summary
            .providers
            .iter()
            .flat_map(|p| p.aggregated_scores.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 按指标降序排名，缺少该指标的 provider 排在最后，同分按名称
    pub fn rank_providers<'a>(
        &self,
        providers: &'a [ProviderPerformance],
        metric: &str,
    ) -> Vec<&'a ProviderPerformance> {
        let mut ranked: Vec<&ProviderPerformance> = providers.iter().collect();
        ranked.sort_by(|a, b| {
            let sa = a.aggregated_scores.get(metric);
            let sb = b.aggregated_scores.get(metric);
            match (sa, sb) {
                (Some(x), Some(y)) => y.partial_cmp(x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| a.provider.cmp(&b.provider))
        });
        ranked
    }

    /// 从运行详情计算各 provider 的平均表现
    ///
    /// 只统计成功的结果；非数值分数会被忽略。
    pub fn provider_averages(&self, run: &RunDetail) -> Vec<ProviderPerformance> {
        #[derive(Default)]
        struct Acc {
            documents: usize,
            scores: BTreeMap<String, Vec<f64>>,
            durations: Vec<f64>,
        }

        let mut by_provider: BTreeMap<String, Acc> = BTreeMap::new();

        for doc in &run.documents {
            for (name, result) in &doc.providers {
                if !result.is_success() {
                    continue;
                }
                let acc = by_provider.entry(name.clone()).or_default();
                acc.documents += 1;
                for (metric, value) in &result.aggregated_scores {
                    if let Some(score) = score_of(value) {
                        acc.scores.entry(metric.clone()).or_default().push(score);
                    }
                }
                if let Some(d) = result.duration_seconds {
                    acc.durations.push(d);
                }
            }
        }

        by_provider
            .into_iter()
            .map(|(provider, acc)| ProviderPerformance {
                provider,
                num_documents: acc.documents as u32,
                num_runs: 1,
                aggregated_scores: acc
                    .scores
                    .iter()
                    .filter_map(|(m, v)| mean(v).map(|avg| (m.clone(), avg)))
                    .collect(),
                avg_duration_seconds: mean(&acc.durations),
            })
            .collect()
    }

    /// 时长格式化：45.2s / 2m 05s / 1h 02m
    pub fn format_duration(&self, seconds: Option<f64>) -> String {
        let Some(secs) = seconds else {
            return "-".to_string();
        };
        if secs < 60.0 {
            return format!("{:.1}s", secs);
        }
        let total = secs.round() as u64;
        if total < 3600 {
            format!("{}m {:02}s", total / 60, total % 60)
        } else {
            format!("{}h {:02}m", total / 3600, (total % 3600) / 60)
        }
    }
}
