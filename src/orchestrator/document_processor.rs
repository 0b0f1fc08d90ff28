//! 单个文档处理器 - 编排层
//!
//! 上传一份 PDF，逐个 provider 对比，写出报告与费用，并在运行日志里追加一行摘要

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::ArenaApi;
use crate::models::{Provider, ProviderSettings};
use crate::orchestrator::batch_stats::DocumentReport;
use crate::services::OutputWriter;
use crate::workflow::{CompareFlow, ComparisonOutcome};

/// 单个文档的处理任务
#[derive(Debug, Clone)]
pub struct DocumentJob {
    /// 文档序号（仅用于日志，从 1 开始）
    pub index: usize,
    pub pdf_path: PathBuf,
    pub providers: Vec<Provider>,
    pub page_number: Option<u32>,
}

/// 处理单个文档，返回各 provider 的成败与费用摘要
pub async fn process_document(
    api: Arc<dyn ArenaApi>,
    settings: &ProviderSettings,
    job: DocumentJob,
    output_dir: &str,
    log_file: &Path,
) -> Result<DocumentReport> {
    info!("[文档 {}] 📄 {}", job.index, job.pdf_path.display());

    let flow = CompareFlow::new(api)?;
    let doc = flow
        .upload(&job.pdf_path)
        .await
        .with_context(|| format!("上传失败: {}", job.pdf_path.display()))?;

    // 指定页超出范围时退回整份文档
    let page_number = job.page_number.filter(|p| {
        let ok = doc.contains_page(*p);
        if !ok {
            warn!("[文档 {}] ⚠️ 第 {} 页超出范围，改为解析整份文档", job.index, p);
        }
        ok
    });

    let outcome = flow.run(&doc, &job.providers, settings, page_number).await?;

    let writer = OutputWriter::new(output_dir);
    let written = flow.save(&outcome, &writer).await?;
    info!(
        "[文档 {}] ✓ 成功 {}/{}，已写入 {} 个文件",
        job.index,
        outcome.success_count(),
        outcome.providers.len(),
        written.len()
    );

    if let Err(e) = append_summary(log_file, job.index, &outcome, &flow) {
        warn!("[文档 {}] ⚠️ 写入运行日志失败: {}", job.index, e);
    }

    Ok(DocumentReport::from_outcome(&outcome))
}

fn append_summary(log_file: &Path, index: usize, outcome: &ComparisonOutcome, flow: &CompareFlow) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let costs = outcome.cost.costs();
    let cheapest = flow
        .cost_service()
        .cheapest(costs)
        .map(|c| format!("{} {}", Provider::display_name_of(&c.provider), flow.cost_service().format_usd(c.total_usd)))
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "文档 {} | {} | 成功 {}/{} | 总费用 {}{} | 最便宜 {}\n",
        index,
        outcome.doc.filename,
        outcome.success_count(),
        outcome.providers.len(),
        flow.cost_service().format_usd(costs.total_usd),
        if outcome.cost.is_estimated() { " (估算)" } else { "" },
        cheapest
    );
    for (provider, error) in outcome.failures() {
        line.push_str(&format!("    {} 失败: {}\n", provider.display_name(), error));
    }

    file.write_all(line.as_bytes())?;
    Ok(())
}
