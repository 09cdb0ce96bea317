//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Country restriction passed to the geocoder
pub const DEFAULT_COUNTRY_CODES: &str = "vn";

/// Region appended to ambiguous geocoding queries
pub const DEFAULT_ANCHOR_REGION: &str = "Ho Chi Minh City, Vietnam";

/// Quiet interval before a typed address is geocoded
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// User agent sent to Nominatim (required by its usage policy)
pub const DEFAULT_USER_AGENT: &str = "cafe-scout/0.1.0";

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable holding the AI credential
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "cafe-scout";

/// Spellings that already place an address in the anchor region
pub const DEFAULT_ANCHOR_ALIASES: &[&str] = &[
    "hcm",
    "hồ chí minh",
    "ho chi minh",
    "tp.hcm",
    "sài gòn",
    "saigon",
];

/// Institution abbreviations expanded before geocoding
pub const DEFAULT_ABBREVIATIONS: &[(&str, &str)] = &[
    ("đh khtn", "Đại học Khoa học Tự nhiên"),
    ("dh khtn", "Đại học Khoa học Tự nhiên"),
    ("đh bk", "Đại học Bách Khoa"),
    ("dh bk", "Đại học Bách Khoa"),
    ("đh spkt", "Đại học Sư phạm Kỹ thuật"),
    ("dh spkt", "Đại học Sư phạm Kỹ thuật"),
    ("đhqg", "Đại học Quốc gia"),
    ("dhqg", "Đại học Quốc gia"),
];
