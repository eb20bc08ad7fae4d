//! Streaming linear regression: record decoding, batch sources and the
//! update loop.
//!
//! ```text
//! lines ─▶ IntervalLineSource ─▶ StreamingRunner ─▶ StreamingLinearRegression
//!              (one batch per window)     │
//!                                         └─▶ SharedModel snapshots
//! ```

pub mod cancel;
pub mod decoder;
pub mod runner;
pub mod source;

pub use cancel::CancellationToken;
pub use runner::{BatchReport, BatchStatus, SharedModel, StreamSummary, StreamingRunner};
pub use source::{BatchSender, BatchSource, ChannelSource, IntervalLineSource, channel_source};
