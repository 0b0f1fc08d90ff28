//! 反馈记录服务 - 业务能力层
//!
//! 只负责"追加一条对战记录"能力，不关心流程

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{BattleAssignment, Preference};

/// 一条对战反馈记录（JSON Lines 中的一行）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub battle_id: String,
    pub file_id: String,
    pub filename: String,
    pub page_number: u32,
    pub preference: Preference,
    pub preferred_labels: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub assignments: Vec<BattleAssignment>,
    pub submitted_at: DateTime<Utc>,
}

/// 反馈记录服务
///
/// 职责：
/// - 把揭晓后的对战结果追加到本地 JSONL 文件
/// - 只处理单条记录
pub struct FeedbackWriter {
    log_path: PathBuf,
}

impl FeedbackWriter {
    /// 以指定文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// 追加一条记录
    pub async fn write(&self, record: &FeedbackRecord) -> Result<()> {
        debug!(
            "写入对战记录: {} | 第 {} 页 | {}",
            record.battle_id, record.page_number, record.preference
        );

        if let Some(parent) = self.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("创建目录失败: {}", parent.display()))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("打开反馈文件失败: {}", self.log_path.display()))?;

        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;

        Ok(())
    }

    /// 读取全部记录，文件不存在时返回空列表
    pub fn read_all(&self) -> Result<Vec<FeedbackRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.log_path)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).context("反馈记录格式错误"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(battle_id: &str, preference: Preference) -> FeedbackRecord {
        FeedbackRecord {
            battle_id: battle_id.to_string(),
            file_id: "f1".to_string(),
            filename: "paper.pdf".to_string(),
            page_number: 1,
            preference,
            preferred_labels: preference.preferred_labels(),
            comment: None,
            assignments: vec![BattleAssignment {
                label: "A".to_string(),
                provider: "reducto".to_string(),
            }],
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FeedbackWriter::with_path(dir.path().join("logs").join("feedback.jsonl"));

        writer.write(&record("b1", Preference::A)).await.unwrap();
        writer.write(&record("b2", Preference::BothBad)).await.unwrap();

        let records = writer.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].battle_id, "b1");
        assert_eq!(records[1].preference, Preference::BothBad);
        assert!(records[1].preferred_labels.is_empty());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FeedbackWriter::with_path(dir.path().join("none.jsonl"));
        assert!(writer.read_all().unwrap().is_empty());
    }
}
