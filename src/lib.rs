//! plyboard: graphs written as text, stepped solver replay, and budgeted
//! game-tree search.
//!
//! The member crates are re-exported whole; [`types`] gathers the names most
//! callers need.
//!
//! ```
//! use plyboard::types::{Graph, GraphNotation};
//!
//! let graph = Graph::from_notation("GENERIC\nNODE A\nNODE B\nEDGE A B -b").unwrap();
//! assert_eq!(graph.edge_count(), 1);
//! assert!(graph.stringify().starts_with("GENERIC\n"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;

pub use plyboard_adversarial;
pub use plyboard_core;
pub use plyboard_graph;
pub use plyboard_notation;

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`.
///
/// Defaults to `warn` when `RUST_LOG` is unset. Does nothing if a global
/// subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
