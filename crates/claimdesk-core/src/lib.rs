pub mod analysis;
pub mod config;
pub mod config_file;
pub mod debounce;
pub mod gateway;
pub mod model;

// Re-export for convenience
pub use analysis::{AnalysisView, Notice, NoticeLevel, Snapshot, ViewError, ViewState};
pub use config::ApiConfig;
pub use debounce::{SearchDebouncer, SearchOutcome, TextChange};
pub use gateway::{ArticleGateway, GatewayError, HttpGateway, MockGateway};
pub use model::{Article, ArticleUpdate, Claim, UpdateResponse};
