//! 对战流程 - 流程层
//!
//! 核心职责：定义"一场盲测对战"的完整处理流程
//!
//! 流程顺序：
//! 1. 上传 PDF → 获取页数
//! 2. 选择页码 → 对战模式调用对比接口（只展示匿名标签）
//! 3. 提交偏好（遇到 "battle run not found" 线性退避重试）
//! 4. 揭晓标签归属 → 写入反馈记录

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::ArenaApi;
use crate::config::Config;
use crate::error::{AppError, AppResult, BattleError, FileError};
use crate::models::{
    is_pdf, BattleAssignment, BattleMetadata, FeedbackRequest, ParseCompareRequest, Preference,
    Provider, ProviderParseResult, ProviderSettings,
};
use crate::services::{FeedbackRecord, FeedbackWriter, MarkdownService};
use crate::utils::{retry_with_backoff, LinearBackoff};
use crate::workflow::battle_ctx::DocumentCtx;

/// 进行中的一轮对战
#[derive(Debug, Clone)]
pub struct BattleRound {
    pub page_number: u32,
    pub metadata: BattleMetadata,
    pub results: BTreeMap<String, ProviderParseResult>,
}

/// 对战状态
#[derive(Debug, Clone)]
pub enum BattleState {
    Idle,
    Uploaded {
        doc: DocumentCtx,
    },
    AwaitingFeedback {
        doc: DocumentCtx,
        round: BattleRound,
    },
    Revealed {
        doc: DocumentCtx,
        round: BattleRound,
        assignments: Vec<BattleAssignment>,
    },
    Failed {
        reason: String,
    },
}

impl BattleState {
    pub fn name(&self) -> &'static str {
        match self {
            BattleState::Idle => "Idle",
            BattleState::Uploaded { .. } => "Uploaded",
            BattleState::AwaitingFeedback { .. } => "AwaitingFeedback",
            BattleState::Revealed { .. } => "Revealed",
            BattleState::Failed { .. } => "Failed",
        }
    }

    fn document(&self) -> Option<&DocumentCtx> {
        match self {
            BattleState::Uploaded { doc }
            | BattleState::AwaitingFeedback { doc, .. }
            | BattleState::Revealed { doc, .. } => Some(doc),
            BattleState::Idle | BattleState::Failed { .. } => None,
        }
    }
}

/// 盲测阶段的单个输出，只有匿名标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlindOutput {
    /// 展示用标签，如 "Provider A"
    pub title: String,
    pub label: String,
    pub markdown: Option<String>,
}

/// 揭晓后的单个输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedOutput {
    pub label: String,
    /// provider 展示名称，如 "Reducto"
    pub provider: String,
    pub preferred: bool,
    pub markdown: Option<String>,
}

/// 对战流程
///
/// - 持有状态机，决定每一步是否允许
/// - 只依赖 ArenaApi 与业务能力（services）
pub struct BattleFlow {
    api: Arc<dyn ArenaApi>,
    markdown: MarkdownService,
    feedback_writer: Option<FeedbackWriter>,
    retry_policy: LinearBackoff,
    state: BattleState,
}

impl BattleFlow {
    /// 创建新的对战流程，反馈记录写入 `config.feedback_log_file`
    pub fn new(api: Arc<dyn ArenaApi>, config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            api,
            markdown: MarkdownService::new()?,
            feedback_writer: Some(FeedbackWriter::with_path(&config.feedback_log_file)),
            retry_policy: LinearBackoff::new(
                config.feedback_max_attempts,
                Duration::from_millis(config.feedback_retry_base_delay_ms),
            ),
            state: BattleState::Idle,
        })
    }

    /// 不写反馈记录
    pub fn without_feedback_log(mut self) -> Self {
        self.feedback_writer = None;
        self
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    fn invalid_state(&self, expected: &'static str) -> AppError {
        BattleError::InvalidState {
            expected,
            actual: self.state.name(),
        }
        .into()
    }

    fn fail(&mut self, error: AppError) -> AppError {
        warn!("⚠️ 对战失败: {}", error);
        self.state = BattleState::Failed {
            reason: error.user_message(),
        };
        error
    }

    /// 上传 PDF 并获取页数
    ///
    /// 等待反馈期间不允许上传新文件；其它状态都会重新开始。
    pub async fn upload(&mut self, pdf_path: &Path) -> AppResult<DocumentCtx> {
        if matches!(self.state, BattleState::AwaitingFeedback { .. }) {
            return Err(self.invalid_state("Idle"));
        }
        if !is_pdf(pdf_path) {
            return Err(FileError::NotPdf {
                path: pdf_path.display().to_string(),
            }
            .into());
        }

        info!("📤 上传 {}", pdf_path.display());
        let result = self.api.upload_pdf(pdf_path).await;
        let uploaded = match result {
            Ok(uploaded) => uploaded,
            Err(e) => return Err(self.fail(e)),
        };

        let result = self.api.page_count(&uploaded.file_id).await;
        let pages = match result {
            Ok(pages) => pages,
            Err(e) => return Err(self.fail(e)),
        };

        let doc = DocumentCtx::new(uploaded.file_id, uploaded.filename, pages.page_count);
        info!("✓ 上传完成 {}", doc);
        self.state = BattleState::Uploaded { doc: doc.clone() };
        Ok(doc)
    }

    /// 对已上传的文件开始对战
    pub async fn attach(&mut self, file_id: &str) -> AppResult<DocumentCtx> {
        if matches!(self.state, BattleState::AwaitingFeedback { .. }) {
            return Err(self.invalid_state("Idle"));
        }
        let result = self.api.page_count(file_id).await;
        let pages = match result {
            Ok(pages) => pages,
            Err(e) => return Err(self.fail(e)),
        };
        let doc = DocumentCtx::new(pages.file_id, pages.filename, pages.page_count);
        self.state = BattleState::Uploaded { doc: doc.clone() };
        Ok(doc)
    }

    /// 在指定页上运行一轮对战，返回匿名输出
    ///
    /// provider 不足两个、页码越界或缺少 API key 时在本地拒绝，状态不变。
    pub async fn run(
        &mut self,
        page_number: u32,
        providers: &[Provider],
        settings: &ProviderSettings,
    ) -> AppResult<Vec<BlindOutput>> {
        let doc = match &self.state {
            BattleState::Uploaded { doc } | BattleState::Revealed { doc, .. } => doc.clone(),
            _ => return Err(self.invalid_state("Uploaded")),
        };

        let distinct: BTreeSet<Provider> = providers.iter().copied().collect();
        if distinct.len() < 2 {
            return Err(BattleError::NotEnoughProviders {
                count: distinct.len(),
            }
            .into());
        }

        if !doc.contains_page(page_number) {
            return Err(BattleError::PageOutOfRange {
                page: page_number,
                page_count: doc.page_count,
            }
            .into());
        }

        let request = ParseCompareRequest {
            file_id: doc.file_id.clone(),
            providers: providers.to_vec(),
            api_keys: settings.api_keys_for(providers)?,
            configs: settings.configs_for(providers),
            page_number: Some(page_number),
            battle_mode: true,
        };

        info!("⚔️ 开始对战 {} 第 {} 页", doc, page_number);
        let result = self.api.compare(&request).await;
        let response = match result {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e)),
        };

        let Some(metadata) = response.battle_metadata else {
            return Err(self.fail(BattleError::MissingMetadata.into()));
        };
        let labels = metadata.labels();
        let distinct_labels: BTreeSet<&String> = labels.iter().collect();
        if labels.len() != 2 || distinct_labels.len() != 2 {
            return Err(self.fail(BattleError::InvalidAssignment { labels }.into()));
        }
        debug!("对战 {} 标签: {:?}", metadata.battle_id, labels);

        let round = BattleRound {
            page_number,
            metadata,
            results: response.results,
        };
        let outputs = self.blind_outputs(&round);
        self.state = BattleState::AwaitingFeedback { doc, round };
        Ok(outputs)
    }

    fn page_markdown(&self, round: &BattleRound, provider: &str) -> Option<String> {
        round
            .results
            .get(provider)
            .and_then(|result| self.markdown.page_markdown(provider, result, round.page_number))
    }

    fn blind_outputs(&self, round: &BattleRound) -> Vec<BlindOutput> {
        round
            .metadata
            .assignments
            .iter()
            .map(|a| BlindOutput {
                title: format!("Provider {}", a.label),
                label: a.label.clone(),
                markdown: self.page_markdown(round, &a.provider),
            })
            .collect()
    }

    /// 提交偏好并揭晓
    ///
    /// 偏好标签必须全部属于本场对战，否则本地拒绝。
    pub async fn submit_feedback(
        &mut self,
        preference: Preference,
        comment: Option<String>,
    ) -> AppResult<Vec<RevealedOutput>> {
        let (doc, round) = match &self.state {
            BattleState::AwaitingFeedback { doc, round } => (doc.clone(), round.clone()),
            _ => return Err(self.invalid_state("AwaitingFeedback")),
        };

        let preferred_labels = preference.preferred_labels();
        let available = round.metadata.labels();
        if let Some(unknown) = preferred_labels.iter().find(|l| !available.contains(*l)) {
            return Err(BattleError::UnknownLabel {
                label: unknown.clone(),
                available,
            }
            .into());
        }

        let request = FeedbackRequest {
            battle_id: round.metadata.battle_id.clone(),
            preferred_labels: preferred_labels.clone(),
            comment: comment.clone(),
        };

        info!("📨 提交偏好 {} (对战 {})", preference, request.battle_id);
        let api = Arc::clone(&self.api);
        let result = retry_with_backoff(self.retry_policy, AppError::is_battle_not_found, |attempt| {
            let api = Arc::clone(&api);
            let request = request.clone();
            async move {
                debug!("提交反馈 第 {} 次", attempt);
                api.submit_feedback(&request).await
            }
        })
        .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e)),
        };

        let assignments = self.reconcile(&round.metadata, response.assignments);
        let outputs: Vec<RevealedOutput> = assignments
            .iter()
            .map(|a| RevealedOutput {
                label: a.label.clone(),
                provider: Provider::display_name_of(&a.provider),
                preferred: preferred_labels.contains(&a.label),
                markdown: self.page_markdown(&round, &a.provider),
            })
            .collect();

        for output in &outputs {
            info!("🎉 Provider {} = {}", output.label, output.provider);
        }

        self.record(&doc, &round, preference, preferred_labels, comment, &assignments)
            .await;

        self.state = BattleState::Revealed {
            doc,
            round,
            assignments,
        };
        Ok(outputs)
    }

    /// 以后端揭晓结果为准，与对战元数据不一致时记录警告
    fn reconcile(
        &self,
        metadata: &BattleMetadata,
        revealed: Vec<BattleAssignment>,
    ) -> Vec<BattleAssignment> {
        if revealed.is_empty() {
            warn!("⚠️ 后端未返回标签归属，使用对战元数据");
            return metadata.assignments.clone();
        }

        let mismatched = revealed.len() != metadata.assignments.len()
            || revealed
                .iter()
                .any(|a| metadata.provider_for(&a.label) != Some(a.provider.as_str()));
        if mismatched {
            warn!(
                "⚠️ 揭晓结果与对战元数据不一致 (对战 {}): 元数据 {:?}, 后端 {:?}",
                metadata.battle_id, metadata.assignments, revealed
            );
        }
        revealed
    }

    async fn record(
        &self,
        doc: &DocumentCtx,
        round: &BattleRound,
        preference: Preference,
        preferred_labels: Vec<String>,
        comment: Option<String>,
        assignments: &[BattleAssignment],
    ) {
        let Some(writer) = &self.feedback_writer else {
            return;
        };
        let record = FeedbackRecord {
            battle_id: round.metadata.battle_id.clone(),
            file_id: doc.file_id.clone(),
            filename: doc.filename.clone(),
            page_number: round.page_number,
            preference,
            preferred_labels,
            comment,
            assignments: assignments.to_vec(),
            submitted_at: Utc::now(),
        };
        if let Err(e) = writer.write(&record).await {
            warn!("⚠️ 写入反馈记录失败 ({}): {}", writer.path().display(), e);
        }
    }

    /// 当前文档（若有）
    pub fn document(&self) -> Option<&DocumentCtx> {
        self.state.document()
    }
}
