// Tracing setup
//
// Events go to stderr, filtered by `RUST_LOG` when set and `warn` otherwise
// so the interactive screen stays quiet. Calling init more than once is a
// no-op.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
