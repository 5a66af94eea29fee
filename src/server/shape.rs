//! Per-route response shaping
//!
//! Every resolving route runs the same pipeline; a [`ResponseShape`] picks
//! which view of the [`Resolution`] goes on the wire.

use crate::Error;
use crate::pipeline::Resolution;
use crate::types::{
    DirectResponse, DlResponse, ErrorResponse, FormatsResponse, MediaType, ResolutionResponse,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Which view of a resolution a route returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Everything: video details, all links, convenience fields
    Full,
    /// Links only
    Formats,
    /// Abbreviated bot-friendly body with bare URLs; the full body when
    /// no video link resolved
    Dl {
        /// Video quality offered as `download` when resolved
        preferred_video: u32,
    },
    /// Top video and top audio link only
    Direct,
}

impl ResponseShape {
    pub fn render(self, resolution: Resolution, developer: &str) -> Response {
        match self {
            ResponseShape::Full => Json(full_body(resolution, developer)).into_response(),
            ResponseShape::Formats => Json(FormatsResponse {
                success: true,
                video_id: resolution.video.id.clone(),
                title: resolution.video.title.clone(),
                total: resolution.links.len(),
                formats: resolution.links,
                developer: developer.to_string(),
            })
            .into_response(),
            ResponseShape::Dl { preferred_video } => {
                let Some(download) = resolution
                    .links
                    .find(MediaType::Video, preferred_video)
                    .or_else(|| resolution.highest_video())
                    .map(|l| l.url.clone())
                else {
                    return Json(full_body(resolution, developer)).into_response();
                };
                Json(DlResponse {
                    success: true,
                    title: resolution.video.title.clone(),
                    download,
                    audio: resolution.best_audio().map(|l| l.url.clone()),
                    developer: developer.to_string(),
                })
                .into_response()
            }
            ResponseShape::Direct => Json(DirectResponse {
                success: true,
                video_id: resolution.video.id.clone(),
                title: resolution.video.title.clone(),
                video: resolution.highest_video().cloned(),
                audio: resolution.best_audio().cloned(),
                developer: developer.to_string(),
            })
            .into_response(),
        }
    }
}

/// Full resolution body, shared with the one-shot CLI
pub fn full_body(resolution: Resolution, developer: &str) -> ResolutionResponse {
    let highest_video = resolution.highest_video().cloned();
    let best_audio = resolution.best_audio().cloned();

    ResolutionResponse {
        success: true,
        query: resolution.query,
        video_id: resolution.video.id.clone(),
        video: resolution.video,
        metadata_source: resolution.metadata_source,
        formats: resolution.links,
        highest_video,
        best_audio,
        developer: developer.to_string(),
    }
}

/// Which family of routes is answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// `/api`, `/search`, `/dl`: failures still answer 200
    Legacy,
    /// `/api/*`: failures carry a matching status code
    Api,
}

impl Surface {
    pub fn status_for(self, error: &Error) -> StatusCode {
        match self {
            Surface::Legacy => StatusCode::OK,
            Surface::Api => error.status_code(),
        }
    }

    fn bad_request(self) -> StatusCode {
        match self {
            Surface::Legacy => StatusCode::OK,
            Surface::Api => StatusCode::BAD_REQUEST,
        }
    }
}

/// Failure body with the status the surface calls for
pub fn failure(surface: Surface, error: &Error, body: ErrorResponse) -> Response {
    match error {
        Error::Config { .. } | Error::Internal { .. } => {
            tracing::error!("Request failed: {}", crate::error::format_error_for_logging(error))
        }
        _ => tracing::warn!("Request failed ({}): {}", error.category(), error),
    }
    (surface.status_for(error), Json(body)).into_response()
}

/// Missing or blank required parameter
pub fn missing_parameter(
    surface: Surface,
    message: &str,
    example: &str,
    developer: &str,
) -> Response {
    let body = ErrorResponse::new(message)
        .with_category("validation")
        .with_example(example)
        .with_developer(developer);
    (surface.bad_request(), Json(body)).into_response()
}
