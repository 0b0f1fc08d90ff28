//! # RAGRace Arena
//!
//! 文档解析 provider（LlamaIndex / Reducto / LandingAI）的对比、盲测与基准测试客户端
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 后端接入层（Clients）
//! - `clients/` - `ArenaApi` trait 描述后端的全部能力
//! - `RagRaceClient` - 基于 reqwest 的 HTTP 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `MarkdownService` - 解析结果整理与报告
//! - `CostService` - 费用排序与离线估算
//! - `PerformanceService` - 指标汇总与排名
//! - `FeedbackWriter` / `OutputWriter` - 本地落盘
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一场对战"或"一次对比"的完整流程
//! - `BattleFlow` - 上传 → 盲测 → 提交偏好（重试）→ 揭晓
//! - `CompareFlow` - 逐个 provider 对比 + 费用
//! - `ResultsBrowser` - 运行记录与数据集表现
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量文档处理器，管理并发
//! - `orchestrator/batch_stats` - 按 provider 汇总成败与费用
//! - `orchestrator/document_processor` - 单个文档处理器
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ArenaApi, RagRaceClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Preference, Provider, ProviderSettings};
pub use orchestrator::App;
pub use workflow::{BattleFlow, BattleState, CompareFlow, ResultsBrowser};
