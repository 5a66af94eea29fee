//! Utility functions and helpers

pub mod version;
pub mod video_id;

pub use version::{VERSION, get_version};
pub use video_id::{extract_video_id, watch_url};
