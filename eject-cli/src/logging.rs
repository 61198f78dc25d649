// SPDX-License-Identifier: GPL-3.0-only

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "warn";
const DEBUG_DIRECTIVE: &str = "warn,udisks_eject=debug,eject_udisks=debug";

/// Log to stderr. `--debug` overrides `RUST_LOG` for our own crates.
pub(crate) fn init(debug: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(debug))
        .with_target(debug)
        .without_time()
        .init();
}

fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new(DEBUG_DIRECTIVE);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}
