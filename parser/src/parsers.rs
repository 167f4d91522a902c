//! Central parser registration module
//!
//! Every input format the analyzer accepts is listed here once. When adding
//! a new format:
//! 1. Create the parser file (e.g., pcapng_text_parser.rs)
//! 2. Export it in lib.rs
//! 3. Add it to the `all_parsers()` function below
//!
//! Order matters for auto-detection: the first parser whose `can_parse`
//! accepts a sample wins.

use crate::base_parser::Parser;
use crate::{AnalysisJsonParser, OmciTextParser};
use tracing::info;

/// Returns a vector of all available parsers.
pub fn all_parsers() -> Vec<Box<dyn Parser>> {
    info!("Initializing parser collection");

    crate::register_parsers![
        AnalysisJsonParser,
        OmciTextParser,
    ]
}

/// Boxes a list of parsers into a `Vec<Box<dyn Parser>>`.
///
/// Usage:
/// ```rust,ignore
/// register_parsers![
///     AnalysisJsonParser,
///     OmciTextParser,
/// ]
/// ```
#[macro_export]
macro_rules! register_parsers {
    ($($parser:expr),* $(,)?) => {
        vec![
            $(Box::new($parser) as Box<dyn $crate::base_parser::Parser>),*
        ]
    };
}
