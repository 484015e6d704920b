use std::io;

use anyhow::Result;
use clap::Parser;
use dashboard_cli::{Cli, execute, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out).await
}
