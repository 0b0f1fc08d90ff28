pub mod battle;
pub mod benchmark;
pub mod loaders;
pub mod parsing;
pub mod provider;
pub mod results;
pub mod settings;

pub use battle::{BattleAssignment, BattleMetadata, FeedbackRequest, FeedbackResponse, Preference};
pub use benchmark::{BenchmarkRequest, BenchmarkResponse};
pub use loaders::{is_pdf, list_pdf_files, load_settings};
pub use parsing::{
    CostComparisonResponse, CostRequest, PageCountRequest, PageCountResponse, PageData,
    ParseCompareRequest, ParseCompareResponse, ProviderCost, ProviderParseResult, UploadResponse,
};
pub use provider::Provider;
pub use results::{
    DatasetInfo, DatasetPerformanceSummary, DocumentResult, ProviderDetailResponse,
    ProviderDocumentDetail, ProviderPerformance, ProviderResult, QuestionResult, ResultsListResponse,
    RunDetail, RunSummary,
};
pub use settings::{LandingAIConfig, LlamaIndexConfig, ProviderSettings, ReductoConfig};
