pub mod text_parser;

pub use text_parser::{first_letters, parse_terms};
