/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// REPORT SUBMISSION LIMITS
// =============================================================================

/// Minimum trimmed description length, in characters
pub const DESCRIPTION_MIN_CHARS: usize = 10;

/// Maximum trimmed description length, in characters
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Maximum title length, in characters
pub const TITLE_MAX_CHARS: usize = 100;

/// Maximum attachment size in bytes (5MB)
pub const MAX_ATTACHMENT_SIZE: usize = 5 * 1024 * 1024;

/// Image types accepted as report attachments
pub const ALLOWED_ATTACHMENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Object key prefix (below the public prefix) for report attachments
pub const REPORT_ATTACHMENT_DIR: &str = "reports";

/// Note written on the audit entry created with every new report
pub const SUBMISSION_NOTE: &str = "submitted by citizen";

// =============================================================================
// NATIONAL BOUNDING BOX
// =============================================================================

/// Reports may only be pinned inside this box (Philippine territory)
pub const MIN_LATITUDE: f64 = 4.0;
pub const MAX_LATITUDE: f64 = 21.0;
pub const MIN_LONGITUDE: f64 = 116.0;
pub const MAX_LONGITUDE: f64 = 127.0;
