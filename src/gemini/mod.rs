mod gemini;
mod prompt;
mod response_parse;

pub use gemini::{response_text, GeminiClient, LanguageModel};
pub use prompt::PromptTemplate;
pub use response_parse::{recover, Recovered, RecoveryStrategy};
