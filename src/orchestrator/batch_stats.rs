//! 批量统计 - 编排层
//!
//! 按 provider 汇总解析成功/失败次数，并累计费用

use anyhow::Result;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::models::Provider;
use crate::services::CostService;
use crate::workflow::ComparisonOutcome;

/// 单个文档的对比摘要
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    pub succeeded: Vec<Provider>,
    pub failed: Vec<Provider>,
    pub total_usd: f64,
    pub estimated: bool,
}

impl DocumentReport {
    pub fn from_outcome(outcome: &ComparisonOutcome) -> Self {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for p in &outcome.providers {
            if p.result.is_ok() {
                succeeded.push(p.provider);
            } else {
                failed.push(p.provider);
            }
        }
        Self {
            succeeded,
            failed,
            total_usd: outcome.cost.costs().total_usd,
            estimated: outcome.cost.is_estimated(),
        }
    }

    /// 至少一个 provider 成功即视为文档成功
    pub fn is_success(&self) -> bool {
        !self.succeeded.is_empty()
    }
}

/// 单个 provider 的解析次数
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProviderTally {
    pub success: usize,
    pub failed: usize,
}

impl ProviderTally {
    pub fn total(&self) -> usize {
        self.success + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.success as f64 / self.total() as f64
        }
    }
}

/// 处理统计（整次运行或单个批次）
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessingStats {
    /// 文档数
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    pub providers: BTreeMap<Provider, ProviderTally>,
    pub total_usd: f64,
    /// 费用为离线估算的文档数
    pub estimated_documents: usize,
}

impl ProcessingStats {
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// 记录一个完成对比的文档
    pub fn record(&mut self, report: &DocumentReport) {
        if report.is_success() {
            self.success += 1;
        } else {
            self.failed += 1;
        }
        for provider in &report.succeeded {
            self.providers.entry(*provider).or_default().success += 1;
        }
        for provider in &report.failed {
            self.providers.entry(*provider).or_default().failed += 1;
        }
        self.total_usd += report.total_usd;
        if report.estimated {
            self.estimated_documents += 1;
        }
    }

    /// 记录一个未能完成对比的文档（上传失败、任务崩溃等）
    pub fn record_error(&mut self) {
        self.failed += 1;
    }

    pub fn merge(&mut self, other: &ProcessingStats) {
        self.success += other.success;
        self.failed += other.failed;
        for (provider, tally) in &other.providers {
            let entry = self.providers.entry(*provider).or_default();
            entry.success += tally.success;
            entry.failed += tally.failed;
        }
        self.total_usd += other.total_usd;
        self.estimated_documents += other.estimated_documents;
    }

    /// 每个 provider 一行，最后一行为费用合计
    pub fn summary_lines(&self) -> Vec<String> {
        let cost = CostService::new();
        let mut lines: Vec<String> = self
            .providers
            .iter()
            .map(|(provider, tally)| {
                format!(
                    "{:<10} 成功 {}/{} ({:.0}%)",
                    provider.display_name(),
                    tally.success,
                    tally.total(),
                    tally.success_rate() * 100.0
                )
            })
            .collect();
        let mut total = format!("费用合计 {}", cost.format_usd(self.total_usd));
        if self.estimated_documents > 0 {
            total.push_str(&format!(" (其中 {} 个文档为估算)", self.estimated_documents));
        }
        lines.push(total);
        lines
    }

    /// 输出批次统计
    pub fn log_batch(&self, batch_num: usize, total_batches: usize) {
        info!("\n{}", "─".repeat(60));
        info!(
            "✓ 第 {}/{} 批完成: 文档成功 {}/{}",
            batch_num,
            total_batches,
            self.success,
            self.success + self.failed
        );
        for line in self.summary_lines() {
            info!("  {}", line);
        }
        info!("{}", "─".repeat(60));
    }

    /// 输出最终统计
    pub fn log_final(&self, log_file: &Path) {
        info!("\n{}", "=".repeat(60));
        info!("📊 批量对比完成");
        info!("{}", "=".repeat(60));
        info!("✅ 文档成功: {}/{}", self.success, self.total);
        info!("❌ 文档失败: {}", self.failed);
        for line in self.summary_lines() {
            info!("📈 {}", line);
        }
        info!("{}", "=".repeat(60));
        info!("\n日志已保存至: {}", log_file.display());
    }

    /// 把最终统计追加到运行日志
    pub fn append_to_log(&self, log_file: &Path) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(log_file)?;
        let mut block = format!(
            "\n{}\n完成 - {} | 文档成功 {}/{}\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.success,
            self.total
        );
        for line in self.summary_lines() {
            block.push_str(&line);
            block.push('\n');
        }
        file.write_all(block.as_bytes())?;
        Ok(())
    }
}
