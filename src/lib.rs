//! ytdl-gateway
//!
//! An HTTP façade that turns a free-text query or a video URL into direct
//! download links at several video and audio qualities.
//!
//! # Pipeline
//!
//! One request runs one pipeline invocation:
//!
//! 1. **Search**: free text becomes a video id (pasted URLs skip this step)
//! 2. **Metadata**: the CDN returns an AES-128-CBC sealed envelope; when it
//!    fails, a minimal record is rebuilt from the origin stream manifest
//! 3. **Links**: each planned quality is asked of the CDN, then of the origin
//!    manifest, then of an optional mirror
//! 4. **Assembly**: links are de-duplicated, sorted and shaped per route
//!
//! # Usage
//!
//! ```bash
//! ytdl-gateway server --port 8000
//! ytdl-gateway --query "barota"
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use ytdl_gateway::{ResolveOptions, Resolver, Settings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::default();
//! let resolver = Resolver::from_settings(&settings)?;
//! let resolution = resolver
//!     .resolve_query("barota", ResolveOptions::default())
//!     .await?;
//! println!("{} links", resolution.links.len());
//! # Ok(())
//! # }
//! ```

pub mod cdn;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod direct;
pub mod error;
pub mod network;
pub mod pipeline;
pub mod search;
pub mod server;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use pipeline::{ResolveOptions, Resolution, Resolver};
pub use types::{DownloadLink, ErrorResponse, LinkSet, LinkSource, MediaType, ResolutionResponse};
