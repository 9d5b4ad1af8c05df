pub mod lesson;
pub mod module;
pub mod portfolio;
pub mod progress;

pub use lesson::{Lesson, LessonId, NewLessonRequest, UpdateLessonRequest};
pub use module::{ContentType, Difficulty, Module, ModuleFilter, NewModuleRequest, UpdateModuleRequest};
pub use portfolio::{AssetType, NewPortfolioItemRequest, PortfolioItem, UpdatePortfolioItemRequest};
pub use progress::{CompletionRecord, Enrollment};
