//! Vision module
//!
//! Camera-frame handling. Capture itself happens outside this crate; frames
//! arrive as borrowed pixel buffers and are reduced to scalar samples here.

mod frame;

pub use frame::{green_channel_mean, FrameView};
