//! Output formatting

pub mod human;
pub mod json;

use crate::cli::OutputFormat;
use crate::protocol::ResponseData;

/// Format an operation result for output
pub fn format_data(data: &ResponseData, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => human::format(data),
        OutputFormat::Json => json::format(data),
    }
}
