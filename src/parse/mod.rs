mod languages;
mod parser;
mod walker;

pub use languages::Language;
pub use parser::{CppParser, TreeParser};
pub use walker::{expand_braces, FileWalker, GlobMatcher};
