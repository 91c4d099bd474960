//! Logging facilities for featurescope.
//!
//! featurescope logs through the `tracing` facade and never installs a
//! subscriber itself. Applications pick one, for example:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("featurescope=debug,featurescope_core::polling=trace")
//!     .init();
//! ```
//!
//! The constants in [`targets`] name every subsystem so logs can be filtered
//! per component, and [`PerfSpan`] times an operation for as long as the
//! guard lives.

/// Target names for log filtering.
pub mod targets {
    /// Polling thread lifecycle and worker faults.
    pub const POLLING: &str = "featurescope_core::polling";
    /// Signal emission.
    pub const SIGNAL: &str = "featurescope_core::signal";
    /// Feature tree construction and edits.
    pub const MODEL: &str = "featurescope::model";
    /// Filter proxy rebuilds and row decisions.
    pub const FILTER: &str = "featurescope::filter";
    /// Editor creation and commits.
    pub const EDITOR: &str = "featurescope::editor";
    /// Viewer configuration loading.
    pub const CONFIG: &str = "featurescope::config";
    /// Device list updates.
    pub const DEVICE: &str = "featurescope::device";
}

/// Span names used for performance tracing.
pub mod span_names {
    /// Feature tree build span.
    pub const TREE_BUILD: &str = "featurescope::tree_build";
    /// Filter mapping rebuild span.
    pub const FILTER_REBUILD: &str = "featurescope::filter_rebuild";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// ```
/// use featurescope_core::logging::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("populate");
///     // timed work
/// }
/// ```
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new performance span for `operation`.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::debug_span!(target: "featurescope::perf", "perf", operation);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_are_namespaced() {
        for target in [
            targets::POLLING,
            targets::SIGNAL,
            targets::MODEL,
            targets::FILTER,
            targets::EDITOR,
            targets::CONFIG,
            targets::DEVICE,
        ] {
            assert!(target.starts_with("featurescope"));
        }
    }

    #[test]
    fn test_perf_span_without_subscriber() {
        let span = PerfSpan::new("noop");
        drop(span);
    }
}
