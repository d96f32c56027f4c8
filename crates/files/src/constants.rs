/// Total copy attempts (first copy plus retries) before a replica is declared corrupt.
pub const MAX_COPY_ATTEMPTS: u32 = 15;

/// Media type reported for zero-length content.
pub const MIME_EMPTY: &str = "application/x-empty";

/// Media type reported for UTF-8 content with no recognisable signature.
pub const MIME_TEXT_PLAIN: &str = "text/plain";

/// Media type reported for anything else.
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";
