#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from corrupt data.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
// Life of an insert:
// 1. A decimal key comes in through the menu loop
// 2. The engine descends from the root, one buffered node at a time
// 3. Duplicates terminate early; otherwise the key lands in a leaf slot
// 4. A node that reaches the full order splits, cascading toward the root
//
// System components:
//  - Paged index file (header block + append-only node blocks)
//  - B+ tree engine over the paged file
//  - Walker for file-order inspection

pub mod config;
mod e2e_tests;
pub mod repl;
pub mod storage;
#[cfg(test)]
mod testing;
