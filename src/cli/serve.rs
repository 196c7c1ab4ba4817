//! Line-delimited JSON server over stdin/stdout

use crate::analyzer::Analyzer;
use crate::cli::Cli;
use crate::core::error::Result;
use crate::protocol::{Request, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

/// Answer one JSON request per input line until stdin closes
pub async fn run(analyzer: &Analyzer, cli: &Cli) -> Result<()> {
    if let Some(init) = cli.init_method() {
        if let Err(e) = analyzer.dispatch(init).await {
            warn!(error = %e, "Initial root could not be set");
        }
    }

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    let mut line = String::new();

    info!("Serving requests on stdin");

    while reader.read_line(&mut line).await? > 0 {
        if line.trim().is_empty() {
            line.clear();
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => analyzer.handle(request).await,
            Err(e) => Response::error("error".to_string(), e.to_string()),
        };

        let json = serde_json::to_string(&response)? + "\n";
        writer.write_all(json.as_bytes()).await?;
        writer.flush().await?;

        line.clear();
    }

    info!("Input closed, shutting down");
    Ok(())
}
