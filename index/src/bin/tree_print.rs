#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from corrupt data.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! Print every node block of an index file in file order.

use std::path::PathBuf;

use clap::Parser;
use index::storage::btree::Node;
use index::storage::{BlockOffset, NO_BLOCK, Walker, WalkerError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "tree-print",
    about = "Print every node block of an index file in file order"
)]
struct Args {
    /// Path to the index file.
    index_file: PathBuf,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "index=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), WalkerError> {
    let mut walker = Walker::open(&args.index_file)?;

    let header = walker.header();
    println!(
        "header: header_size={} block_size={} tree_order={} root_offset={}",
        header.header_size,
        header.block_size,
        header.tree_order,
        format_offset(header.root_offset),
    );

    while let Some((offset, node)) = walker.next_node()? {
        println!("{}", render(offset, &node));
    }

    Ok(())
}

/// One line per block: the used keys and the child slots around them, with
/// `<nip>` for absent offsets.
fn render(offset: BlockOffset, node: &Node) -> String {
    let keys: Vec<String> = node.keys[..node.used()]
        .iter()
        .map(ToString::to_string)
        .collect();
    let children: Vec<String> = node.children[..=node.used()]
        .iter()
        .map(|&child| format_offset(child))
        .collect();

    format!(
        "@{offset}: keys_used={} leaf={} parent={} keys=[{}] children=[{}]",
        node.keys_used,
        u8::from(node.is_leaf),
        format_offset(node.parent),
        keys.join(", "),
        children.join(", "),
    )
}

fn format_offset(offset: BlockOffset) -> String {
    if offset == NO_BLOCK {
        "<nip>".to_string()
    } else {
        offset.to_string()
    }
}
