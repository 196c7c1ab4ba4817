//! Heuristic knowledge layered over extracted structure
//!
//! - `subsystem` - engine area names mapped to source directories
//! - `patterns` - idiom catalog, line detector and best-practice lookup
//! - `api` - documentation records synthesized from classes, with ranking
//!
//! @module knowledge

pub mod api;
pub mod patterns;
pub mod subsystem;

pub use api::{ApiCategory, ApiQueryOptions, ApiQueryResult, ApiReference};
pub use patterns::{CodePatternMatch, LearningResource, PatternInfo};
pub use subsystem::{Subsystem, SubsystemInfo};
