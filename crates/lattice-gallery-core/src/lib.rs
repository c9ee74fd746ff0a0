//! Core systems shared by the lattice gallery crates.
//!
//! - **Signal/Slot System**: type-safe notifications for selection, expansion
//!   and default-action events
//! - **Logging**: `tracing` targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use lattice_gallery_core::Signal;
//!
//! let selection_changed = Signal::<Vec<usize>>::new();
//!
//! let conn_id = selection_changed.connect(|indices| {
//!     println!("now selected: {indices:?}");
//! });
//!
//! selection_changed.emit(vec![0, 3]);
//! selection_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::SignalError;
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
