// file: src/query/mod.rs
// description: query translation from tool parameters to the engine's query language
// reference: internal module structure

pub mod filetype;
pub mod translator;

pub use filetype::{is_text_mimetype, resolve_filetype};
pub use translator::{MATCH_ALL, QueryTranslator, quote_if_needed};
