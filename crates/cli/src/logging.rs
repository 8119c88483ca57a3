use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for a `-v` count: warn, then info, then debug.
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the stderr subscriber.
///
/// Explicit `-v` flags win over `RUST_LOG`; without them `RUST_LOG` is
/// honored and the level falls back to `warn`. Stdout stays reserved for
/// `--json` output.
pub fn init(verbosity: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = if verbosity > 0 {
        EnvFilter::try_new(default_level(verbosity))?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level(0)))?
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
