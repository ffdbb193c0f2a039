pub mod config;
pub mod dashboard;
#[cfg(feature = "xlsx")]
pub mod export;
pub mod report;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::aggregate::VerticalBase;
use crate::client::ReportSource;
use crate::error::{PainelError, Result};
use crate::models::{Granularity, MomSeries, StatementKind};
use crate::periods::YearFilter;
use crate::reports::ReportOptions;
use crate::settings::Settings;

/// What every command needs: effective settings and a data source that can be
/// handed to background loaders.
#[derive(Clone)]
pub struct AppContext {
    pub settings: Settings,
    pub source: Arc<dyn ReportSource>,
}

#[derive(Parser)]
#[command(
    name = "painel",
    version,
    about = "Terminal dashboard for cash-flow (DFC) and income (DRE) statements."
)]
pub struct Cli {
    /// Base URL of the reports API (overrides settings for this run)
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,
    /// Skip the in-memory response cache
    #[arg(long = "no-cache", global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a report (interactive on a terminal, plain text otherwise).
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export a statement to an .xlsx workbook.
    #[cfg(feature = "xlsx")]
    Export {
        /// Statement to export
        #[arg(value_enum)]
        kind: StatementKind,
        #[command(flatten)]
        filters: StatementArgs,
        /// Output file path (default: <export_dir>/<kind>-YYYY-MM-DD.xlsx)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    View,
    Text,
    Export,
}

/// Filters and optional columns shared by `report dfc|dre` and `export`.
#[derive(Args, Clone)]
pub struct StatementArgs {
    /// Year filter: YYYY or 'all'
    #[arg(long, default_value = "all")]
    pub year: String,
    /// Period granularity
    #[arg(long, value_enum, default_value_t = Granularity::Month)]
    pub granularity: Granularity,
    /// Show budget columns
    #[arg(long)]
    pub budget: bool,
    /// Show variance against budget
    #[arg(long)]
    pub variance: bool,
    /// Show vertical analysis (AV)
    #[arg(long)]
    pub vertical: bool,
    /// Show horizontal analysis (AH)
    #[arg(long)]
    pub horizontal: bool,
    /// Base for vertical analysis (default: server for DFC, dynamic for DRE)
    #[arg(long = "av-base", value_enum)]
    pub av_base: Option<VerticalBase>,
}

impl StatementArgs {
    pub fn options(&self, kind: StatementKind) -> Result<ReportOptions> {
        let year: YearFilter = self.year.parse()?;
        let mut opts = ReportOptions::new(self.granularity, year);
        opts.show_budget = self.budget;
        opts.show_variance = self.variance;
        opts.show_vertical = self.vertical;
        opts.show_horizontal = self.horizontal;
        opts.vertical_base = self.av_base.unwrap_or(default_vertical_base(kind));
        Ok(opts)
    }
}

/// The DRE backend does not send per-period vertical maps, so its AV is
/// computed client-side unless asked otherwise.
pub fn default_vertical_base(kind: StatementKind) -> VerticalBase {
    match kind {
        StatementKind::Dfc => VerticalBase::Server,
        StatementKind::Dre => VerticalBase::Dynamic,
    }
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Cash-flow statement (DFC).
    Dfc {
        #[command(flatten)]
        filters: StatementArgs,
        #[arg(long, value_enum)]
        mode: Option<OutputMode>,
        /// Export to this .xlsx path
        #[arg(long)]
        output: Option<String>,
    },
    /// Income statement (DRE).
    Dre {
        #[command(flatten)]
        filters: StatementArgs,
        #[arg(long, value_enum)]
        mode: Option<OutputMode>,
        /// Export to this .xlsx path
        #[arg(long)]
        output: Option<String>,
    },
    /// Month-over-month series chart.
    Mom {
        #[arg(value_enum)]
        series: MomSeries,
        /// Month to select initially: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        #[arg(long, value_enum)]
        mode: Option<OutputMode>,
    },
    /// Net movement (receivables minus payables) per month.
    Net {
        /// Month to select initially: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        #[arg(long, value_enum)]
        mode: Option<OutputMode>,
    },
}

impl ReportCommands {
    pub fn mode(&self) -> Option<OutputMode> {
        match self {
            ReportCommands::Dfc { mode, .. }
            | ReportCommands::Dre { mode, .. }
            | ReportCommands::Mom { mode, .. }
            | ReportCommands::Net { mode, .. } => *mode,
        }
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            ReportCommands::Dfc { output, .. } | ReportCommands::Dre { output, .. } => {
                output.as_deref()
            }
            _ => None,
        }
    }

    pub fn statement_kind(&self) -> Option<StatementKind> {
        match self {
            ReportCommands::Dfc { .. } => Some(StatementKind::Dfc),
            ReportCommands::Dre { .. } => Some(StatementKind::Dre),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings.
    Show,
    /// Change one or more settings. `--api-url` given here is persisted.
    Set {
        /// Response cache lifetime in seconds
        #[arg(long = "cache-ttl")]
        cache_ttl: Option<u64>,
        /// HTTP request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Default directory for exported workbooks
        #[arg(long = "export-dir")]
        export_dir: Option<String>,
    },
}

/// Validate a `YYYY-MM` month argument.
pub(crate) fn parse_month_opt(month: &Option<String>) -> Result<Option<String>> {
    let Some(m) = month else {
        return Ok(None);
    };
    let valid = match m.split_once('-') {
        Some((y, mm)) => {
            y.len() == 4
                && y.parse::<i32>().is_ok()
                && mm.parse::<u32>().map(|n| (1..=12).contains(&n)).unwrap_or(false)
        }
        None => false,
    };
    if valid {
        Ok(Some(m.clone()))
    } else {
        Err(PainelError::InvalidArgument(format!("month must be YYYY-MM, got '{m}'")))
    }
}
