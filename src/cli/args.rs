//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;

use clap::{Parser, ValueEnum};

use crate::config::Config;
use crate::consts::{
    BURN_WINDOW_MINUTES, MAX5_TOKEN_LIMIT, MAX20_TOKEN_LIMIT, PRO_TOKEN_LIMIT,
    SESSION_WINDOW_HOURS,
};
use crate::core::PlanConfig;
use crate::error::AppError;

use super::commands::Commands;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum Plan {
    /// Pro plan (44K quota tokens per window, default)
    #[default]
    Pro,
    /// Max 5x plan (88K quota tokens per window)
    Max5,
    /// Max 20x plan (220K quota tokens per window)
    Max20,
    /// Custom ceiling; requires --limit
    Custom,
}

impl Plan {
    fn label(self) -> &'static str {
        match self {
            Plan::Pro => "pro",
            Plan::Max5 => "max5",
            Plan::Max20 => "max20",
            Plan::Custom => "custom",
        }
    }

    /// Lenient parse for config-file values; unknown names are ignored by
    /// the caller rather than reported, matching flag-merge behavior.
    fn parse_loose(value: &str) -> Option<Plan> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pro" => Some(Plan::Pro),
            "max5" => Some(Plan::Max5),
            "max20" => Some(Plan::Max20),
            "custom" => Some(Plan::Custom),
            _ => None,
        }
    }

    fn builtin_limit(self) -> Option<u64> {
        match self {
            Plan::Pro => Some(PRO_TOKEN_LIMIT),
            Plan::Max5 => Some(MAX5_TOKEN_LIMIT),
            Plan::Max20 => Some(MAX20_TOKEN_LIMIT),
            Plan::Custom => None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ccquota")]
#[command(about = "Rolling session-window quota monitor for Claude Code", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Usage plan determining the token ceiling
    #[arg(short, long, global = true, value_enum)]
    pub(crate) plan: Option<Plan>,

    /// Token ceiling (quota tokens per window); overrides the plan's
    /// built-in ceiling, and implies --plan custom when no plan is given
    #[arg(short, long, global = true, value_name = "TOKENS")]
    pub(crate) limit: Option<u64>,

    /// Output as JSON
    #[arg(short, long, global = true)]
    pub(crate) json: bool,

    /// Read log lines from stdin instead of discovering log files
    #[arg(long, global = true)]
    pub(crate) stdin: bool,

    /// Evaluate metrics at this instant instead of the wall clock (RFC 3339)
    #[arg(long, global = true, value_name = "INSTANT")]
    pub(crate) at: Option<String>,

    /// Session window length in hours
    #[arg(long, global = true, value_name = "HOURS",
          default_value_t = SESSION_WINDOW_HOURS,
          value_parser = clap::value_parser!(i64).range(1..))]
    pub(crate) session_hours: i64,

    /// Trailing burn-rate window in minutes
    #[arg(long, global = true, value_name = "MINUTES",
          default_value_t = BURN_WINDOW_MINUTES,
          value_parser = clap::value_parser!(i64).range(1..))]
    pub(crate) burn_minutes: i64,

    /// Timezone for the daily cutoff and display (e.g. "UTC", "Asia/Shanghai")
    #[arg(long, global = true, value_name = "TZ")]
    pub(crate) timezone: Option<String>,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long, global = true)]
    pub(crate) no_color: bool,

    /// Compact output (fewer rows and columns, shorter numbers)
    #[arg(short = 'c', long, global = true)]
    pub(crate) compact: bool,

    /// Enable debug output (show skipped-line details)
    #[arg(long, global = true)]
    pub(crate) debug: bool,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        if self.plan.is_none()
            && let Some(ref plan) = config.plan
        {
            self.plan = Plan::parse_loose(plan);
        }
        if self.limit.is_none() {
            self.limit = config.limit;
        }
        if self.timezone.is_none() {
            self.timezone = config.timezone.clone();
        }
        if !self.no_color && config.no_color {
            self.no_color = true;
        }
        if !self.compact && config.compact {
            self.compact = true;
        }
        if !self.debug && config.debug {
            self.debug = true;
        }
        self
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    /// Resolve the effective plan and token ceiling.
    ///
    /// An explicit --limit always wins as the ceiling; a bare --limit with
    /// no --plan reads as a custom plan.
    pub(crate) fn plan_config(&self) -> Result<PlanConfig, AppError> {
        let plan = match (self.plan, self.limit) {
            (Some(plan), _) => plan,
            (None, Some(_)) => Plan::Custom,
            (None, None) => Plan::default(),
        };
        let token_limit = match self.limit.or(plan.builtin_limit()) {
            Some(limit) => Some(limit),
            None => return Err(AppError::MissingLimit),
        };
        Ok(PlanConfig {
            plan_name: plan.label().to_string(),
            token_limit,
        })
    }
}
