pub mod loaders;
pub mod question;
pub mod source;

pub use loaders::load_sources_manifest;
pub use question::{AnswerKey, CanonicalQuestion, QuestionId, QuestionType};
pub use source::{QuizMode, QuizSource, PROVIDER_EXAM_COUNTS};
