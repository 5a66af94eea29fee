//! Resolution pipeline
//!
//! One pipeline invocation per request; route handlers only reshape its
//! [`Resolution`].

pub mod ladder;
pub mod resolver;

pub use ladder::{degrade_candidates, pick_best_effort, plan};
pub use resolver::{ResolveOptions, Resolution, Resolver, ResolverGeneric};
