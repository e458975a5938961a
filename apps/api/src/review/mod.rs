// CV review: extract text from a submission, ask the LLM for a critique,
// coerce the answer into a fixed schema.
// All LLM calls go through llm_client via the ReviewModel seam.

pub mod extract;
pub mod handlers;
pub mod invoker;
pub mod models;
pub mod prompts;
pub mod sanitizer;
pub mod service;
