use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("vereinonline-client-rs/", env!("CARGO_PKG_VERSION"));

pub const API_PARAM: &str = "api";
pub const TOKEN_PARAM: &str = "token";

pub const VERIFY_LOGIN_ENDPOINT: &str = "VerifyLogin";
pub const GET_MEMBERS_ENDPOINT: &str = "GetMembers";
pub const GET_MEMBER_ENDPOINT: &str = "GetMember";
pub const UPDATE_MEMBER_ENDPOINT: &str = "UpdateMember";
pub const GET_GROUPS_ENDPOINT: &str = "GetGroups";

pub const ACCEPT_JSON: &str = "application/json";
pub const ACCEPT_HTML: &str = "text/html, application/xhtml+xml, application/xml;q=0.9, */*;q=0.8";

// The admin pages answer in Windows-1252 unless the response says otherwise.
pub const RESPONSE_DEFAULT_CHARSET: &str = "windows-1252";
pub const REQUEST_DEFAULT_CHARSET: &str = "utf-8";
// Charset the legacy admin forms expect on submission.
pub const FORM_CHARSET: &str = "iso-8859-1";

pub const MAIL_TEMPLATES_ACTION: &str = "admin_mailtemplates";

pub const REGISTER_LINE_SELECTOR: &str = ".registerline";
pub const SUBJECT_INPUT_SELECTOR: &str = r#"input[name="subject"]"#;
pub const BODY_TEXTAREA_SELECTOR: &str = r#"textarea[name="werte"]"#;
pub const ACTIVE_CLASS: &str = "active";

pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("accept-language", "de-DE,de;q=0.9,en;q=0.5"),
    ("connection", "keep-alive"),
];

pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (k, v) in DEFAULT_HEADERS {
        let name = HeaderName::from_static(k);
        if let Ok(val) = HeaderValue::from_str(v) {
            headers.insert(name, val);
        }
    }
    headers
}

pub fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}
