pub mod gateway;
pub mod handlers;
pub mod normalizer;
pub mod pipeline;
pub mod prompt_builder;
pub mod prompts;
