//! 批量文档处理器 - 编排层
//!
//! ## 职责
//!
//! 批量对比模式的入口，负责资源与并发管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：输出目录与运行日志
//! 2. **批量加载**：扫描 `pdf_folder` 下的所有 PDF
//! 3. **并发控制**：使用 Semaphore 限制同时处理的文档数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：按 provider 汇总成败与费用

use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients::ArenaApi;
use crate::config::Config;
use crate::models::{list_pdf_files, Provider, ProviderSettings};
use crate::orchestrator::batch_stats::ProcessingStats;
use crate::orchestrator::document_processor::{self, DocumentJob};
use crate::utils::logging;

/// 批量模式应用
pub struct App {
    config: Config,
    api: Arc<dyn ArenaApi>,
    settings: Arc<ProviderSettings>,
    providers: Vec<Provider>,
    page_number: Option<u32>,
    log_file: PathBuf,
}

impl App {
    /// 初始化应用：创建输出目录与运行日志
    pub fn initialize(
        config: Config,
        api: Arc<dyn ArenaApi>,
        settings: ProviderSettings,
        providers: Vec<Provider>,
        page_number: Option<u32>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("创建输出目录失败: {}", config.output_dir))?;
        let log_file = Path::new(&config.output_dir).join("batch.log");
        logging::init_log_file(&log_file.to_string_lossy(), &providers, page_number)?;
        logging::log_startup(config.base_url(), config.max_concurrent_documents);

        Ok(Self {
            config,
            api,
            settings: Arc::new(settings),
            providers,
            page_number,
            log_file,
        })
    }

    /// 运行批量对比
    pub async fn run(&self) -> Result<ProcessingStats> {
        info!("\n📁 正在扫描待处理的 PDF...");
        let documents = list_pdf_files(&self.config.pdf_folder).await?;

        if documents.is_empty() {
            warn!("⚠️ 没有找到待处理的 PDF 文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        let concurrency = self.config.max_concurrent_documents.max(1);
        info!("✓ 找到 {} 个 PDF，每批 {} 个", documents.len(), concurrency);

        let stats = self.process_all_documents(documents, concurrency).await?;

        stats.log_final(&self.log_file);
        if let Err(e) = stats.append_to_log(&self.log_file) {
            warn!("⚠️ 写入运行日志失败: {}", e);
        }
        Ok(stats)
    }

    async fn process_all_documents(&self, documents: Vec<PathBuf>, concurrency: usize) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let total = documents.len();
        let total_batches = total.div_ceil(concurrency);
        let mut stats = ProcessingStats::with_total(total);

        for (batch_idx, batch) in documents.chunks(concurrency).enumerate() {
            let batch_start = batch_idx * concurrency;
            info!(
                "\n📦 第 {}/{} 批: 文档 {}-{} / 共 {} 个",
                batch_idx + 1,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total
            );

            let batch_stats = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;
            batch_stats.log_batch(batch_idx + 1, total_batches);
            stats.merge(&batch_stats);
        }

        Ok(stats)
    }

    async fn process_batch(
        &self,
        batch: &[PathBuf],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<ProcessingStats> {
        let mut indices = Vec::with_capacity(batch.len());
        let mut handles = Vec::with_capacity(batch.len());

        for (idx, pdf_path) in batch.iter().enumerate() {
            let doc_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let job = DocumentJob {
                index: doc_index,
                pdf_path: pdf_path.clone(),
                providers: self.providers.clone(),
                page_number: self.page_number,
            };
            let api = Arc::clone(&self.api);
            let settings = Arc::clone(&self.settings);
            let output_dir = self.config.output_dir.clone();
            let log_file = self.log_file.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                document_processor::process_document(api, &settings, job, &output_dir, &log_file).await
            });
            indices.push(doc_index);
            handles.push(handle);
        }

        // 等待本批所有任务完成
        let mut result = ProcessingStats::with_total(batch.len());
        for (doc_index, joined) in indices.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(report)) => result.record(&report),
                Ok(Err(e)) => {
                    error!("[文档 {}] ❌ 处理过程中发生错误: {:#}", doc_index, e);
                    result.record_error();
                }
                Err(e) => {
                    error!("[文档 {}] 任务执行失败: {}", doc_index, e);
                    result.record_error();
                }
            }
        }

        Ok(result)
    }
}
