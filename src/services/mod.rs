pub mod cost_service;
pub mod feedback_writer;
pub mod markdown_service;
pub mod output_writer;
pub mod performance_service;

pub use cost_service::CostService;
pub use feedback_writer::{FeedbackRecord, FeedbackWriter};
pub use markdown_service::MarkdownService;
pub use output_writer::OutputWriter;
pub use performance_service::PerformanceService;
