//! One-shot resolve mode
//!
//! Runs the pipeline once and prints the same JSON body `/api` would return.
//! Logs go to stderr so stdout stays machine-readable.

use super::{LogTarget, init_logging, load_settings};
use crate::{
    Error,
    pipeline::{ResolveOptions, Resolver},
    server::full_body,
    types::{ErrorResponse, parse_selection},
};
use anyhow::Result;

/// Arguments for resolve mode
#[derive(Debug, Default)]
pub struct ResolveArgs {
    /// Free-text search
    pub query: Option<String>,
    /// Video URL or bare id
    pub url: Option<String>,
    /// Quality to make sure is attempted
    pub quality: Option<String>,
    /// `video` or `audio`, paired with `quality`
    pub media_type: Option<String>,
    pub config: Option<String>,
    pub verbose: bool,
}

/// What to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Query(String),
    Source(String),
}

impl ResolveArgs {
    /// `--url` wins over `--query`; blank values count as absent
    pub fn target(&self) -> Option<Target> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        non_blank(&self.url)
            .map(Target::Source)
            .or_else(|| non_blank(&self.query).map(Target::Query))
    }
}

/// Run resolve mode with the given arguments
pub async fn run_resolve_mode(args: ResolveArgs) -> Result<()> {
    let mut settings = load_settings(args.config.as_deref());
    settings.logging.verbose |= args.verbose;
    init_logging(&settings, LogTarget::Stderr);

    let developer = settings.pipeline.attribution.clone();

    let Some(target) = args.target() else {
        let body = ErrorResponse::new("either --query or --url is required")
            .with_category("validation")
            .with_example("ytdl-gateway --query \"barota\"")
            .with_developer(&developer);
        println!("{}", serde_json::to_string_pretty(&body)?);
        std::process::exit(2);
    };

    match resolve(&settings, &args, &target).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            tracing::error!("{}", crate::error::format_error_for_logging(&e));
            let body = ErrorResponse::from_error(&e).with_developer(&developer);
            let body = match &target {
                Target::Query(q) => body.with_query(q),
                Target::Source(u) => body.with_url(u),
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
    }
}

async fn resolve(
    settings: &crate::Settings,
    args: &ResolveArgs,
    target: &Target,
) -> crate::Result<String> {
    let options = if args.quality.is_some() || args.media_type.is_some() {
        let (media_type, quality) = parse_selection(
            args.media_type.as_deref(),
            args.quality.as_deref(),
            settings.pipeline.default_video_quality,
            settings.pipeline.default_audio_quality,
        )?;
        ResolveOptions::requesting(media_type, quality)
    } else {
        ResolveOptions::default()
    };

    let resolver = Resolver::from_settings(settings)?;
    let resolution = match target {
        Target::Query(q) => resolver.resolve_query(q, options).await?,
        Target::Source(u) => resolver.resolve_source(u, options).await?,
    };

    let body = full_body(resolution, &settings.pipeline.attribution);
    serde_json::to_string_pretty(&body).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_prefers_url() {
        let args = ResolveArgs {
            query: Some("barota".to_string()),
            url: Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            args.target(),
            Some(Target::Source("https://youtu.be/dQw4w9WgXcQ".to_string()))
        );
    }

    #[test]
    fn test_target_blank_is_absent() {
        let args = ResolveArgs {
            query: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(args.target(), None);

        let args = ResolveArgs {
            query: Some(" barota ".to_string()),
            ..Default::default()
        };
        assert_eq!(args.target(), Some(Target::Query("barota".to_string())));
    }

    #[tokio::test]
    async fn test_resolve_rejects_bad_quality_before_network() {
        let settings = crate::Settings::default();
        let args = ResolveArgs {
            quality: Some("hd".to_string()),
            ..Default::default()
        };
        let err = resolve(&settings, &args, &Target::Query("barota".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "validation");
    }
}
