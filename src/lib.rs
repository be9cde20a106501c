//! ecashx - eCash block explorer client
//!
//! Browses the latest blocks, the transactions of a block, and an address's
//! transactions, outpoints and token balances through the explorer REST API.
//!
//! ## Architecture
//!
//! - **Core** (all targets): formatters, the pagination planner, URL
//!   parameter state, table controllers and views. Everything here is
//!   synchronous and owned by a single UI task.
//! - **Native**: terminal UI using crossterm and ratatui, with fetches on
//!   tokio tasks that report back over a channel.
//! - **Web** (`dom-web`): browser history as the parameter store.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --features native -- /block-height/700000
//! ```

// Core modules (available on all platforms)
pub mod config;
pub mod format;
pub mod pagination;
pub mod params;
pub mod tabs;
pub mod theme;
pub mod types;

// Deep link router (available on all platforms)
pub mod router;

// REST client and table plumbing
pub mod api;
pub mod table;
pub mod views;

pub mod app;
pub mod ui;

// Platform abstraction layer
pub mod platform;

// Network utilities (429 backoff for native builds)
pub mod net;

// Fetch worker (tokio tasks)
#[cfg(feature = "native")]
pub mod source;

// Re-export commonly used types
pub use app::{App, InputMode};
pub use config::Config;
pub use types::{AppEvent, BlockRow, TxRow};
