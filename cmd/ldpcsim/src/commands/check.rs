//! Check command implementation.

use anyhow::{Context, Result};
use ldpc_code::{CodeDescriptor, LdpcCode};
use ldpc_sim::{SimConfig, Simulator};
use std::sync::Arc;
use tracing::info;

/// Runs the check command.
pub fn run(code_path: &str, config_path: Option<&str>) -> Result<()> {
    let code = LdpcCode::load(code_path)
        .with_context(|| format!("Failed to load code: {code_path}"))?;

    let n = code.block_length();
    let m = code.check_count();
    let max_col = (0..n).map(|v| code.var_neighbors(v).len()).max().unwrap_or(0);
    let max_row = (0..m).map(|c| code.check_neighbors(c).len()).max().unwrap_or(0);
    info!(
        n,
        m,
        edges = code.edge_count(),
        max_col_weight = max_col,
        max_row_weight = max_row,
        "Code {code_path} is well formed"
    );

    let config = match config_path {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {path}"))?,
        None => SimConfig::default(),
    };
    let sim = Simulator::new(Arc::new(code), config).with_context(|| "Invalid simulation setup")?;
    println!("{sim}");

    Ok(())
}
