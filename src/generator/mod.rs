//! Question generation pipeline: prompt → LLM → parse → validate → retry.

pub mod parser;
pub mod prompts;
pub mod schema;

mod question_generator;

pub use parser::{RawQuestion, parse};
pub use question_generator::*;
pub use schema::validate;
