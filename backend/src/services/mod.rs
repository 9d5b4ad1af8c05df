pub mod catalog;
pub mod learning;
pub mod portfolio;

pub use catalog::CatalogService;
pub use learning::{CompletionState, LearningService, LessonView, ModuleView};
pub use portfolio::{PortfolioService, PortfolioSummary};
