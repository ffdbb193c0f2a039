use std::path::{Path, PathBuf};

use tracing::info;

use crate::cli::AppContext;
use crate::error::Result;
use crate::models::{Statement, StatementKind};
use crate::reports::{build_statement_report, ReportOptions};

/// `<dir>/<kind>-YYYY-MM-DD.xlsx`
pub fn default_path(dir: &Path, kind: StatementKind) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    dir.join(format!("{}-{date}.xlsx", kind.slug()))
}

fn write_xlsx(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Render an already-fetched statement, fully expanded, and write it to
/// `path`. Used both by the `export` command and the interactive view.
pub fn write_statement(
    statement: &Statement,
    kind: StatementKind,
    opts: &ReportOptions,
    path: &Path,
) -> Result<PathBuf> {
    let report = build_statement_report(statement, kind, opts, None);
    let bytes = crate::xlsx::render_statement(&report, &report.subtitle(opts))?;
    write_xlsx(&bytes, path)?;
    info!(path = %path.display(), rows = report.rows.len(), "exported statement");
    Ok(path.to_path_buf())
}

pub fn run(
    ctx: &AppContext,
    kind: StatementKind,
    opts: &ReportOptions,
    output: Option<&str>,
) -> Result<()> {
    let statement = ctx.source.statement(kind)?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&ctx.settings.export_path(), kind));
    let written = write_statement(&statement, kind, opts, &path)?;
    println!("Wrote {}", written.display());
    Ok(())
}
