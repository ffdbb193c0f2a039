pub mod text;
pub mod view;

use std::io::IsTerminal;

use crate::cli::{parse_month_opt, AppContext, OutputMode, ReportCommands};
use crate::error::{PainelError, Result};

pub fn dispatch(ctx: &AppContext, cmd: ReportCommands) -> Result<()> {
    let wants_export = cmd.output().is_some() || cmd.mode() == Some(OutputMode::Export);

    if wants_export {
        dispatch_export(ctx, cmd)
    } else if cmd.mode() == Some(OutputMode::Text) {
        print_text(ctx, &cmd)
    } else if cmd.mode() == Some(OutputMode::View) || std::io::stdout().is_terminal() {
        view::dispatch(ctx, cmd)
    } else {
        // Non-TTY: plain text to stdout
        print_text(ctx, &cmd)
    }
}

fn print_text(ctx: &AppContext, cmd: &ReportCommands) -> Result<()> {
    let s = dispatch_text(ctx, cmd)?;
    println!("{s}");
    Ok(())
}

pub(crate) fn dispatch_text(ctx: &AppContext, cmd: &ReportCommands) -> Result<String> {
    match cmd {
        ReportCommands::Dfc { filters, .. } | ReportCommands::Dre { filters, .. } => {
            let kind = statement_kind(cmd)?;
            text::statement(ctx.source.as_ref(), kind, &filters.options(kind)?)
        }
        ReportCommands::Mom { series, month, .. } => {
            text::mom(ctx.source.as_ref(), *series, parse_month_opt(month)?.as_deref())
        }
        ReportCommands::Net { month, .. } => {
            text::net(ctx.source.as_ref(), parse_month_opt(month)?.as_deref())
        }
    }
}

fn statement_kind(cmd: &ReportCommands) -> Result<crate::models::StatementKind> {
    cmd.statement_kind()
        .ok_or_else(|| PainelError::Other("not a statement report".into()))
}

fn dispatch_export(ctx: &AppContext, cmd: ReportCommands) -> Result<()> {
    match &cmd {
        ReportCommands::Dfc { filters, .. } | ReportCommands::Dre { filters, .. } => {
            let kind = statement_kind(&cmd)?;
            export_statement(ctx, kind, &filters.options(kind)?, cmd.output())
        }
        ReportCommands::Mom { .. } | ReportCommands::Net { .. } => {
            Err(PainelError::InvalidArgument(
                "only `report dfc` and `report dre` can be exported".into(),
            ))
        }
    }
}

#[cfg(feature = "xlsx")]
fn export_statement(
    ctx: &AppContext,
    kind: crate::models::StatementKind,
    opts: &crate::reports::ReportOptions,
    output: Option<&str>,
) -> Result<()> {
    crate::cli::export::run(ctx, kind, opts, output)
}

#[cfg(not(feature = "xlsx"))]
fn export_statement(
    _ctx: &AppContext,
    _kind: crate::models::StatementKind,
    _opts: &crate::reports::ReportOptions,
    _output: Option<&str>,
) -> Result<()> {
    Err(PainelError::Other(
        "xlsx export requires the 'xlsx' feature; build with `cargo build --features xlsx`".into(),
    ))
}
