//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 批量对比与并发调度，是批量模式的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文档处理器
//! - 管理应用生命周期（初始化、运行）
//! - 扫描 PDF 目录（Vec<PathBuf>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `batch_stats` - 批量统计
//! - 按 provider 统计解析成败
//! - 累计费用，输出批次与最终统计
//!
//! ### `document_processor` - 单个文档处理器
//! - 上传并对比单个 PDF
//! - 写出报告与费用
//! - 追加运行日志摘要
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PathBuf>)
//!     ↓
//! document_processor (处理单个 PDF)
//!     ↓
//! workflow::CompareFlow (逐个 provider 对比)
//!     ↓
//! services (能力层：markdown / cost / output)
//!     ↓
//! clients (后端：ArenaApi)
//! ```

pub mod batch_processor;
pub mod batch_stats;
pub mod document_processor;

pub use batch_processor::App;
pub use batch_stats::{DocumentReport, ProcessingStats, ProviderTally};
pub use document_processor::{process_document, DocumentJob};
