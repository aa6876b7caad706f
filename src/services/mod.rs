pub mod explanation_cleanup;
pub mod format_detector;
pub mod json_repair;
pub mod normalizer;
pub mod sampler;
pub mod validator;

pub use explanation_cleanup::{cleanup_for_provider, ExplanationCleanup};
pub use format_detector::{detect_shape, extract_records, RawRecord, SourceShape};
pub use json_repair::parse_lenient;
pub use normalizer::QuestionNormalizer;
pub use sampler::select_questions;
pub use validator::validate_question;
