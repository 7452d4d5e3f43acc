//! Shared constants.

/// Placeholder title used when a caption carries a title label but no usable value.
pub const DEFAULT_TITLE: &str = "Sem título";

/// Extension used for cover images when the transport does not report one.
pub const DEFAULT_COVER_EXTENSION: &str = "jpg";

/// Extension used for videos when the transport does not report one.
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

/// Content type assumed for cover images.
pub const COVER_CONTENT_TYPE: &str = "image/jpeg";

/// Content type assumed for videos without a reported mime type.
pub const DEFAULT_VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// How long an incomplete submission is kept before the sweeper evicts it.
pub const DEFAULT_SUBMISSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Interval between sweeper runs.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
