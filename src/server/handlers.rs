//! HTTP request handlers
//!
//! Resolving handlers validate parameters, run the pipeline once and hand the
//! [`Resolution`](crate::pipeline::Resolution) to a [`ResponseShape`].

use crate::{
    pipeline::{ResolveOptions, pick_best_effort},
    server::{
        app::AppState,
        shape::{ResponseShape, Surface, failure, missing_parameter},
    },
    types::{
        DecoratedResult, DownloadParams, DownloadResponse, EndpointDoc, ErrorResponse,
        HealthResponse, MediaType, QueryParams, QuickParams, QuickResponse, ResultEndpoints,
        SearchParams, SearchResponse, ServiceDescriptor, SourceParams, parse_selection,
    },
    utils::version,
};
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};

const QUERY_EXAMPLE: &str = "/api?query=barota";
const SOURCE_EXAMPLE: &str = "/api/info?url=https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Service descriptor
///
/// GET /
pub async fn root(State(state): State<AppState>) -> Json<ServiceDescriptor> {
    let endpoints = vec![
        EndpointDoc::new("/health", "Liveness check"),
        EndpointDoc::new("/api?query=", "Search and resolve all links"),
        EndpointDoc::new("/search?query=", "Alias of /api"),
        EndpointDoc::new("/dl?query=", "Abbreviated download URLs"),
        EndpointDoc::new("/api/search?query=&limit=&page=", "Search only"),
        EndpointDoc::new("/api/info?url=", "Resolve a known video"),
        EndpointDoc::new("/api/download?url=&type=&quality=", "One specific link"),
        EndpointDoc::new("/api/formats?url=", "All resolved links"),
        EndpointDoc::new("/api/direct?url=", "Best video and audio link"),
        EndpointDoc::new("/api/quick?query=&type=&quality=", "Search and pick one link"),
        EndpointDoc::new("/api/smart?query=", "Search and pick the default link"),
    ];

    Json(ServiceDescriptor {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: version::get_version().to_string(),
        developer: state.developer().to_string(),
        endpoints,
        example: QUERY_EXAMPLE.to_string(),
    })
}

/// Health check
///
/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    tracing::debug!("Health check: uptime={}s", uptime);
    Json(HealthResponse::new(uptime, version::get_version()))
}

/// GET /api and GET /search
pub async fn legacy_api(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Response {
    resolve_query_as(&state, Surface::Legacy, params.text(), ResponseShape::Full).await
}

/// GET /dl
pub async fn dl(State(state): State<AppState>, Query(params): Query<QueryParams>) -> Response {
    let shape = ResponseShape::Dl {
        preferred_video: state.settings.pipeline.default_video_quality,
    };
    resolve_query_as(&state, Surface::Legacy, params.text(), shape).await
}

/// GET /api/info
pub async fn api_info(
    State(state): State<AppState>,
    Query(params): Query<SourceParams>,
) -> Response {
    resolve_source_as(&state, params.source(), ResponseShape::Full).await
}

/// GET /api/formats
pub async fn api_formats(
    State(state): State<AppState>,
    Query(params): Query<SourceParams>,
) -> Response {
    resolve_source_as(&state, params.source(), ResponseShape::Formats).await
}

/// GET /api/direct
pub async fn api_direct(
    State(state): State<AppState>,
    Query(params): Query<SourceParams>,
) -> Response {
    resolve_source_as(&state, params.source(), ResponseShape::Direct).await
}

/// Search without resolving
///
/// GET /api/search
pub async fn api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let developer = state.developer();
    let Some(query) = params.text() else {
        return missing_parameter(
            Surface::Api,
            "query parameter is required",
            "/api/search?query=barota&limit=5",
            developer,
        );
    };

    let search = &state.settings.search;
    let limit = params.limit(search.default_limit, search.max_limit);
    let page = params.page();
    let offset = (page - 1).saturating_mul(limit);

    match state.resolver.search(query, offset.saturating_add(limit)).await {
        Ok(hits) if hits.is_empty() => {
            let error = crate::Error::not_found_for("videos matching the query", query);
            failure(
                Surface::Api,
                &error,
                ErrorResponse::from_error(&error)
                    .with_query(query)
                    .with_developer(developer),
            )
        }
        Ok(hits) => {
            let results: Vec<DecoratedResult> = hits
                .into_iter()
                .skip(offset)
                .take(limit)
                .map(|result| DecoratedResult {
                    endpoints: ResultEndpoints::for_video(&result.id),
                    result,
                })
                .collect();

            Json(SearchResponse {
                success: true,
                query: query.to_string(),
                page,
                limit,
                count: results.len(),
                results,
            })
            .into_response()
        }
        Err(e) => failure(
            Surface::Api,
            &e,
            ErrorResponse::from_error(&e)
                .with_query(query)
                .with_developer(developer),
        ),
    }
}

/// One specific (type, quality) link
///
/// GET /api/download
pub async fn api_download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Response {
    let developer = state.developer();
    let Some(source) = params.source() else {
        return missing_parameter(
            Surface::Api,
            "url or id parameter is required",
            "/api/download?url=https://youtu.be/dQw4w9WgXcQ&type=video&quality=720",
            developer,
        );
    };

    let pipeline = state.resolver.pipeline_settings();
    let (media_type, quality) = match parse_selection(
        params.media_type.as_deref(),
        params.quality.as_deref(),
        pipeline.default_video_quality,
        pipeline.default_audio_quality,
    ) {
        Ok(selection) => selection,
        Err(e) => return source_failure(&e, source, developer),
    };

    let resolution = match state
        .resolver
        .resolve_source(source, ResolveOptions::requesting(media_type, quality))
        .await
    {
        Ok(resolution) => resolution,
        Err(e) => return source_failure(&e, source, developer),
    };

    match resolution.links.find(media_type, quality) {
        Some(link) => Json(DownloadResponse {
            success: true,
            video_id: resolution.video.id.clone(),
            title: resolution.video.title.clone(),
            download: link.clone(),
            developer: developer.to_string(),
        })
        .into_response(),
        None => {
            let label = media_type.quality_label(quality);
            let error = crate::Error::not_found_for(
                format!("{} link", media_type),
                format!("{} at {}", resolution.video.id, label),
            );
            failure(
                Surface::Api,
                &error,
                ErrorResponse::from_error(&error)
                    .with_url(source)
                    .with_alternatives(
                        media_type.as_str(),
                        quality,
                        resolution.links.available(media_type),
                    )
                    .with_developer(developer),
            )
        }
    }
}

/// Search, then the requested quality or the closest lower one
///
/// GET /api/quick
pub async fn api_quick(
    State(state): State<AppState>,
    Query(params): Query<QuickParams>,
) -> Response {
    let developer = state.developer();
    let Some(query) = params.text() else {
        return missing_parameter(
            Surface::Api,
            "query parameter is required",
            "/api/quick?query=barota&type=audio&quality=128",
            developer,
        );
    };

    let pipeline = state.resolver.pipeline_settings();
    let selection = parse_selection(
        params.media_type.as_deref(),
        params.quality.as_deref(),
        pipeline.default_video_quality,
        pipeline.default_audio_quality,
    );
    match selection {
        Ok((media_type, quality)) => {
            best_effort(&state, query, media_type, quality, Some(quality)).await
        }
        Err(e) => query_failure(&e, query, developer),
    }
}

/// Quick with the default video quality
///
/// GET /api/smart
pub async fn api_smart(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Response {
    let Some(query) = params.text() else {
        return missing_parameter(
            Surface::Api,
            "query parameter is required",
            "/api/smart?query=barota",
            state.developer(),
        );
    };

    let quality = state.resolver.pipeline_settings().default_video_quality;
    best_effort(&state, query, MediaType::Video, quality, None).await
}

async fn best_effort(
    state: &AppState,
    query: &str,
    media_type: MediaType,
    quality: u32,
    requested_quality: Option<u32>,
) -> Response {
    let developer = state.developer();
    let resolution = match state
        .resolver
        .resolve_query(query, ResolveOptions::requesting(media_type, quality))
        .await
    {
        Ok(resolution) => resolution,
        Err(e) => return query_failure(&e, query, developer),
    };

    match pick_best_effort(&resolution.links, media_type, quality) {
        Some((link, fallback)) => {
            if fallback {
                tracing::info!(
                    "{}: {} unavailable, serving {}",
                    resolution.video.id,
                    media_type.quality_label(quality),
                    link.label
                );
            }
            Json(QuickResponse {
                success: true,
                query: query.to_string(),
                video_id: resolution.video.id.clone(),
                title: resolution.video.title.clone(),
                requested_quality,
                download: link.clone(),
                fallback,
                developer: developer.to_string(),
            })
            .into_response()
        }
        None => {
            let error = crate::Error::not_found_for(
                format!("{} link", media_type),
                resolution.video.id.clone(),
            );
            failure(
                Surface::Api,
                &error,
                ErrorResponse::from_error(&error)
                    .with_query(query)
                    .with_alternatives(
                        media_type.as_str(),
                        quality,
                        resolution.links.available(media_type),
                    )
                    .with_developer(developer),
            )
        }
    }
}

async fn resolve_query_as(
    state: &AppState,
    surface: Surface,
    query: Option<&str>,
    shape: ResponseShape,
) -> Response {
    let developer = state.developer();
    let Some(query) = query else {
        return missing_parameter(surface, "query parameter is required", QUERY_EXAMPLE, developer);
    };

    match state
        .resolver
        .resolve_query(query, ResolveOptions::default())
        .await
    {
        Ok(resolution) => shape.render(resolution, developer),
        Err(e) => failure(
            surface,
            &e,
            ErrorResponse::from_error(&e)
                .with_query(query)
                .with_developer(developer),
        ),
    }
}

async fn resolve_source_as(
    state: &AppState,
    source: Option<&str>,
    shape: ResponseShape,
) -> Response {
    let developer = state.developer();
    let Some(source) = source else {
        return missing_parameter(
            Surface::Api,
            "url or id parameter is required",
            SOURCE_EXAMPLE,
            developer,
        );
    };

    match state
        .resolver
        .resolve_source(source, ResolveOptions::default())
        .await
    {
        Ok(resolution) => shape.render(resolution, developer),
        Err(e) => source_failure(&e, source, developer),
    }
}

fn query_failure(error: &crate::Error, query: &str, developer: &str) -> Response {
    failure(
        Surface::Api,
        error,
        ErrorResponse::from_error(error)
            .with_query(query)
            .with_developer(developer),
    )
}

fn source_failure(error: &crate::Error, source: &str, developer: &str) -> Response {
    failure(
        Surface::Api,
        error,
        ErrorResponse::from_error(error)
            .with_url(source)
            .with_developer(developer),
    )
}
