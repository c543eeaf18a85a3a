//! Process-wide tracing setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process.
///
/// `RUST_LOG` overrides the default `info` filter. `json` selects structured
/// JSON lines; otherwise the human-readable formatter is used. Calling this
/// more than once is a no-op.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let _ = if json {
        builder.json().with_target(false).try_init()
    } else {
        builder.pretty().with_target(true).try_init()
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_twice_is_harmless() {
        super::init(false);
        super::init(true);
        tracing::info!("still logging");
    }
}
