//! Log setup.
//!
//! On a CI runner, log events are written as workflow commands so the runner
//! can fold debug output and annotate errors and warnings.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::actions;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "warn,archive_repo=debug";

/// How log events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Workflow commands on stdout (`::debug::`, `::warning::`, `::error::`)
    #[default]
    Actions,
    /// Human-readable lines on stderr
    Plain,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

/// Renders events as workflow commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionsFormat;

impl<S, N> FormatEvent<S, N> for ActionsFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = String::new();
        ctx.field_format()
            .format_fields(Writer::new(&mut message), event)?;

        let line = match *event.metadata().level() {
            Level::ERROR => actions::command("error", &message),
            Level::WARN => actions::command("warning", &message),
            Level::INFO => message,
            _ => actions::command("debug", &message),
        };
        writeln!(writer, "{}", line)
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
pub fn init(format: LogFormat) {
    match format {
        LogFormat::Actions => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stdout)
            .event_format(ActionsFormat)
            .init(),
        LogFormat::Plain => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .init(),
    }
}
