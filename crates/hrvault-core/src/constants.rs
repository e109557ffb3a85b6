//! Shared constants.

/// Default lifetime of presigned object-store URLs (60 minutes).
pub const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 3600;

/// Default bound on a single object-store HTTP call.
pub const DEFAULT_OBJECT_STORE_TIMEOUT_SECS: u64 = 30;

/// Default maximum accepted upload size (25 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE_BYTES: usize = 25 * 1024 * 1024;

/// Page size used by the document list when none is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on the document list page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Longest accepted document display name, in characters.
pub const MAX_DISPLAY_NAME_CHARS: usize = 255;

/// Longest lifetime accepted for a requested temporary URL (7 days, the S3 presign limit).
pub const MAX_URL_EXPIRY_SECS: u64 = 7 * 24 * 3600;
