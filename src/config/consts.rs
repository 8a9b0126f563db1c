// src/config/consts.rs

// Net config
pub const BASE_URL: &str = "https://api.data.gov/ed/collegescorecard/v1/";
pub const DATASET: &str = "schools.json";
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
pub const USER_AGENT: &str = concat!("scorecard/", env!("CARGO_PKG_VERSION"));

// Paging
pub const DEFAULT_PER_PAGE: u32 = 100;
pub const MAX_PER_PAGE: u32 = 100; // server clamps anything larger

// Quota (api.data.gov default for a personal key)
pub const DEFAULT_QUOTA_PER_WINDOW: u32 = 1000;
pub const QUOTA_WINDOW_SECS: u64 = 3600;

// Credential
pub const API_KEY_ENV: &str = "SCORECARD_API_KEY";

// Local files
pub const LOG_FILE: &str = ".store/debug.log";

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_FILE: &str = "schools";
