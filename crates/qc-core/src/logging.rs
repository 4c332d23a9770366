//! Structured logging foundation for qc-core.
//!
//! Dual-mode logging on stderr:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for pipeline/agent workflows
//!
//! stdout stays reserved for command payloads (verdict JSON), so replay
//! output can be piped without log contamination. Level and format are
//! overridable through `QC_LOG` / `RUST_LOG` and `QC_LOG_FORMAT`.

use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Jsonl,
}

/// Logging configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default level filter when no env filter is set (e.g. "info").
    pub level: String,
    pub format: LogFormat,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            format: LogFormat::Human,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Build from environment, with an optional CLI-level override.
    ///
    /// `QC_LOG` sets the level, `QC_LOG_FORMAT=jsonl` switches to JSONL.
    pub fn from_env(cli_level: Option<&str>) -> Self {
        let level = cli_level
            .map(str::to_string)
            .or_else(|| std::env::var("QC_LOG").ok())
            .unwrap_or_else(|| "info".to_string());
        let format = match std::env::var("QC_LOG_FORMAT").as_deref() {
            Ok("jsonl") | Ok("json") => LogFormat::Jsonl,
            _ => LogFormat::Human,
        };
        LogConfig {
            level,
            format,
            timestamps: true,
        }
    }
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs. Respects
/// `RUST_LOG` when set; otherwise filters qc crates at the configured level.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "qc_core={level},qc_config={level},qc_math={level}",
            level = config.level
        ))
    });

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);
            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .init();
            }
        }
        LogFormat::Jsonl => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(false)
                .with_span_list(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
    }
}
