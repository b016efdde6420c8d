//! Field caps and request metadata extraction
//!
//! Every string that reaches a log line or a stored record goes through
//! [`truncate`] first.

use serde_json::Value;
use wayfarer_core::HttpRequest;

pub const DIRECTIVE_MAX: usize = 100;
pub const EFFECTIVE_DIRECTIVE_MAX: usize = 100;
pub const DISPOSITION_MAX: usize = 50;
pub const URI_MAX: usize = 500;
pub const POLICY_MAX: usize = 1000;
pub const SAMPLE_MAX: usize = 200;
pub const USER_AGENT_MAX: usize = 500;
pub const IP_MAX: usize = 45;
pub const MESSAGE_MAX: usize = 1000;
pub const STACK_MAX: usize = 2000;
pub const URL_MAX: usize = 500;
pub const ADDITIONAL_INFO_MAX: usize = 500;
pub const REPORTED_AT_MAX: usize = 100;

/// First `max` characters of `value`
pub fn truncate(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}

/// String form of a JSON scalar; objects, arrays and null become empty
pub fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

pub fn capped_text(value: Option<&Value>, max: usize) -> String {
    truncate(&text(value), max)
}

/// Numeric coercion: numbers and numeric strings are accepted, anything
/// else is 0. Fractions are truncated toward zero.
pub fn coerce_number(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    };
    parsed.unwrap_or(0)
}

/// Client IP: first `X-Forwarded-For` entry, then `X-Real-IP`, else `unknown`
pub fn client_ip(request: &HttpRequest) -> String {
    let forwarded = request
        .header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let ip = forwarded
        .or_else(|| request.header("x-real-ip").map(str::trim).filter(|v| !v.is_empty()))
        .unwrap_or("unknown");

    truncate(ip, IP_MAX)
}

pub fn user_agent(request: &HttpRequest) -> String {
    truncate(request.header("user-agent").unwrap_or_default(), USER_AGENT_MAX)
}
