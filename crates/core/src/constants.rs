/// Constants used throughout the studygate codebase
// Capability tokens
pub const WILDCARD_RESOURCE_ID: &str = "*";
pub const BRIDGE_TOKEN_TTL_SECS: u64 = 600;
pub const MINT_TTL_DEFAULT_SECS: u64 = 600;
pub const MINT_TTL_MIN_SECS: u64 = 60;
pub const MINT_TTL_MAX_SECS: u64 = 21_600;

// Session credentials
pub const SESSION_COOKIE_NAME: &str = "studygate_session";

// Environment variable names
pub const PORT_VAR: &str = "STUDYGATE_PORT";
pub const SIGNING_SECRET_VAR: &str = "STUDYGATE_SIGNING_SECRET";
pub const METADATA_URL_VAR: &str = "STUDYGATE_METADATA_URL";
pub const METADATA_KEY_VAR: &str = "STUDYGATE_METADATA_KEY";
pub const STORAGE_URL_VAR: &str = "STUDYGATE_STORAGE_URL";
pub const STORAGE_KEY_VAR: &str = "STUDYGATE_STORAGE_KEY";
pub const STORAGE_BUCKET_VAR: &str = "STUDYGATE_STORAGE_BUCKET";
pub const REDIS_URL_VAR: &str = "STUDYGATE_REDIS_URL";
pub const TRUSTED_IP_HEADER_VAR: &str = "STUDYGATE_TRUSTED_IP_HEADER";
pub const RATE_LIMIT_WINDOW_VAR: &str = "STUDYGATE_RATE_LIMIT_WINDOW_SECS";
pub const RATE_LIMIT_MAX_REQUESTS_VAR: &str = "STUDYGATE_RATE_LIMIT_MAX_REQUESTS";
pub const RATE_LIMIT_BASE_PENALTY_VAR: &str = "STUDYGATE_RATE_LIMIT_BASE_PENALTY_SECS";
pub const RATE_LIMIT_MULTIPLIER_VAR: &str = "STUDYGATE_RATE_LIMIT_PENALTY_MULTIPLIER";
pub const RATE_LIMIT_MAX_PENALTY_VAR: &str = "STUDYGATE_RATE_LIMIT_MAX_PENALTY_SECS";

// Defaults for optional settings
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORAGE_BUCKET: &str = "resources";
pub const DEFAULT_TRUSTED_IP_HEADER: &str = "x-real-ip";

// Rate limiting defaults
pub const RATE_LIMIT_WINDOW_SECS: u64 = 600;
pub const RATE_LIMIT_MAX_REQUESTS: u32 = 40;
pub const RATE_LIMIT_MAX_REQUESTS_FLOOR: u32 = 1;
pub const RATE_LIMIT_MAX_REQUESTS_CEIL: u32 = 1000;
pub const RATE_LIMIT_BASE_PENALTY_SECS: u64 = 120;
pub const RATE_LIMIT_PENALTY_MULTIPLIER: u32 = 3;
pub const RATE_LIMIT_MAX_PENALTY_SECS: u64 = 21_600;

// Key-value store key layout
pub const RATE_LIMIT_KEY_PREFIX: &str = "ratelimit:";
pub const SNAPSHOT_KEY_PREFIX: &str = "snapshot:";
pub const CONFIG_KEY_MAX_REQUESTS: &str = "config:rate-limit-max-requests";

// Response header names (lowercase; HTTP header names are case-insensitive)
pub const STREAM_TOKEN_HEADER: &str = "x-stream-token";
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";
pub const RATE_LIMIT_VIOLATIONS_HEADER: &str = "x-ratelimit-violation-count";

// Resource listing
pub const SNAPSHOT_TTL_SECS: u64 = 1800;
pub const LIST_CACHE_MAX_AGE_SECS: u64 = 30;
pub const LIST_LIMIT_DEFAULT: u32 = 100;
pub const LIST_LIMIT_CEIL: u32 = 500;
