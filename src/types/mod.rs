//! Type definitions for the gateway
//!
//! This module contains the data model and the request/response wire shapes.

pub mod media;
pub mod request;
pub mod response;

pub use media::{
    DownloadLink, LinkSet, LinkSource, MediaType, ResolvedMetadata, SearchResult, VideoSummary,
    format_duration,
};
pub use request::{
    DownloadParams, QueryParams, QuickParams, SearchParams, SourceParams, parse_quality,
    parse_selection,
};
pub use response::{
    DecoratedResult, DirectResponse, DlResponse, DownloadResponse, EndpointDoc, ErrorResponse,
    FormatsResponse, HealthResponse, QuickResponse, ResolutionResponse, ResultEndpoints,
    SearchResponse, ServiceDescriptor,
};
