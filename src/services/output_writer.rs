//! 结果输出服务 - 业务能力层
//!
//! 把对比结果落盘：`{output_dir}/{文档名}/{provider}.md` 与 `cost.json`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::AppError;
use crate::models::CostComparisonResponse;

pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 文档对应的输出目录（取 PDF 文件名去掉扩展名）
    pub fn document_dir(&self, filename: &str) -> PathBuf {
        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("document");
        self.output_dir.join(stem)
    }

    /// 写入某个 provider 的 markdown 报告
    pub async fn write_markdown(&self, filename: &str, provider: &str, markdown: &str) -> Result<PathBuf> {
        let dir = self.document_dir(filename);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("创建输出目录失败: {}", dir.display()))?;

        let path = dir.join(format!("{}.md", provider));
        fs::write(&path, markdown)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        debug!("已写入 {}", path.display());
        Ok(path)
    }

    /// 写入费用对比
    pub async fn write_cost(&self, filename: &str, costs: &CostComparisonResponse) -> Result<PathBuf> {
        let dir = self.document_dir(filename);
        fs::create_dir_all(&dir).await?;

        let path = dir.join("cost.json");
        let json = serde_json::to_string_pretty(costs)?;
        fs::write(&path, json)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        debug!("已写入 {}", path.display());
        Ok(path)
    }
}
