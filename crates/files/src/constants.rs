/// Media type reported when the payload's magic bytes are not recognised.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// How many successive millisecond slots `put` tries before giving up.
pub const MAX_NAME_ATTEMPTS: u32 = 1_000;
