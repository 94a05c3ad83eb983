pub mod extract;
pub mod prompt;

pub use extract::{EventExtractor, EventFields, OpenAiEventExtractor};
