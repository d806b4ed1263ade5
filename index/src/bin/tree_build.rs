#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from corrupt data.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! Interactive index builder: menu-driven create/open/insert over a single
//! index file.

use index::config::IndexConfig;
use index::repl::Repl;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "index=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match IndexConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    ignore_sigint();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let repl = Repl::new(stdin.lock(), stdout.lock(), config);
    if let Err(e) = repl.run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

/// A split cascade performs several dependent writes with no journal; an
/// interrupt between them would leave parent links inconsistent, so
/// `SIGINT` is ignored for the whole session.
#[allow(unsafe_code)]
fn ignore_sigint() {
    // SAFETY: installing SIG_IGN has no precondition and replaces no
    // Rust-side handler.
    let _ = unsafe { libc::signal(libc::SIGINT, libc::SIG_IGN) };
}
