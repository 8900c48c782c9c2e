use blazebridge_core::constants::BLAZEBRIDGE_LOG_VAR;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use ::tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

/// Initialize the tracing system
///
/// The filter comes from `BLAZEBRIDGE_LOG` when set, otherwise from
/// `default_filter`, otherwise `info`. Output goes to stderr in a compact
/// format so it never interleaves with command output on stdout.
pub fn init(
    default_filter: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_env(BLAZEBRIDGE_LOG_VAR)
        .or_else(|_| EnvFilter::try_new(default_filter.unwrap_or("info")))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Create a span covering one BEP ingestion pass
pub fn bep_span(source: &str) -> Span {
    span!(Level::INFO, "bep", source = %source)
}

/// Emit a structured event for a finished BEP parse
pub fn bep_parse_completed(events: usize, targets: usize, named_sets: usize, truncated: bool) {
    if truncated {
        warn!(
            events = %events,
            targets = %targets,
            named_sets = %named_sets,
            "bep_parse_truncated"
        );
    } else {
        debug!(
            events = %events,
            targets = %targets,
            named_sets = %named_sets,
            "bep_parse_completed"
        );
    }
}

/// Emit a structured event for project data cache operations
pub fn cache_event(operation: &str, hit: bool) {
    if hit {
        debug!(operation = %operation, "cache_hit");
    } else {
        debug!(operation = %operation, "cache_miss");
    }
}
