pub mod config;
pub mod error;
pub mod logger;
pub mod delay_manager;
pub mod rate_limiter;
pub mod input_loader;
pub mod query_template;
pub mod search_engine;
pub mod html_reducer;
pub mod exclusion_patterns;
pub mod language;
pub mod text_normalizer;
pub mod orchestrator;
pub mod extraction_client;
pub mod output;
pub mod testing;

// Exporting types for convenience
pub use error::{EnrichError, Result};
pub use input_loader::InputTable;
pub use query_template::QueryTemplate;
pub use search_engine::{SearchEngine, WebSearch};
pub use rate_limiter::{RateLimiter, RateWindow};
pub use text_normalizer::TextNormalizer;
pub use orchestrator::{EntitySearchOrchestrator, SearchFailurePolicy, SearchRecord};
pub use extraction_client::{ExtractionClient, ExtractionOutcome, ExtractionResult};
