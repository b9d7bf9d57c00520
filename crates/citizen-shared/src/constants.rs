//! Application-wide constants

/// Literal left in `.env.example` style URLs; its presence means the backend
/// was never configured.
pub const BACKEND_URL_PLACEHOLDER: &str = "your-project";

pub const ACCESS_TOKEN_COOKIE: &str = "cc-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "cc-refresh-token";

pub const LOGIN_PATH: &str = "/auth/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const NEXT_PARAM: &str = "next";

pub const PROTECTED_PREFIXES: [&str; 3] = ["/dashboard", "/profile", "/admin"];
pub const AUTH_PREFIXES: [&str; 1] = ["/auth"];

pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const SUGGESTION_LIMIT: usize = 5;

pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];
