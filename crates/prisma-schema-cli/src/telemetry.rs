use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::GlobalOpts;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows `-v`/`-q`.
pub fn init(global: &GlobalOpts) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global.verbose, global.quiet)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!global.no_color)
        .with_target(global.verbose > 1);

    if let Err(error) = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
    {
        eprintln!("warning: logging disabled: {error}");
    }
}

fn default_directive(verbose: u8, quiet: bool) -> String {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    format!("prisma_schema_syntax={level},prisma_schema={level},warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_warn() {
        assert_eq!(
            default_directive(0, false),
            "prisma_schema_syntax=warn,prisma_schema=warn,warn"
        );
    }

    #[test]
    fn verbosity_raises_the_level() {
        assert!(default_directive(1, false).starts_with("prisma_schema_syntax=info"));
        assert!(default_directive(2, false).starts_with("prisma_schema_syntax=debug"));
        assert!(default_directive(7, false).starts_with("prisma_schema_syntax=trace"));
    }

    #[test]
    fn quiet_only_shows_errors() {
        assert!(default_directive(0, true).starts_with("prisma_schema_syntax=error"));
    }

    #[test]
    fn directives_are_valid_filters() {
        for verbose in 0..4 {
            let directive = default_directive(verbose, false);
            assert!(EnvFilter::try_new(&directive).is_ok(), "{directive}");
        }
    }
}
