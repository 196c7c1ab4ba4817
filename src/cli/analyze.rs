//! One-shot query commands

use crate::analyzer::Analyzer;
use crate::cli::Cli;
use crate::core::error::Result;
use crate::output::format_data;
use crate::protocol::ResponseData;
use tracing::info;

/// Initialize from the global root flags, run one query and print it
pub async fn run(analyzer: &Analyzer, cli: &Cli) -> Result<()> {
    if let Some(init) = cli.init_method() {
        if let ResponseData::Initialized(summary) = analyzer.dispatch(init).await? {
            info!(
                root = %summary.root.display(),
                files = summary.files_scanned,
                classes = summary.classes_found,
                "Root initialized"
            );
        }
    }

    let Some(method) = cli.command.to_method() else {
        return Ok(());
    };

    let data = analyzer.dispatch(method).await?;
    print!("{}", format_data(&data, cli.format()));

    Ok(())
}
