use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::http_client::http_client;
use crate::models::{
    GameSummary, LeaderboardEntry, RatingSeries, Tournament, TournamentList, TournamentResult,
    UserProfile, Variant,
};

const JSON_MIME: &str = "application/json";
const DEFAULT_GAMES_MAX: u32 = 10;

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    // Merged over the default `Accept` header; same-named entries win.
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamesQuery {
    pub max: u32,
    pub rated: bool,
}

impl Default for GamesQuery {
    fn default() -> Self {
        Self {
            max: DEFAULT_GAMES_MAX,
            rated: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LichessClient {
    base_url: String,
    http: Client,
}

impl LichessClient {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let http = http_client(config.timeout)?.clone();
        Ok(Self::new(config.api_base.clone(), http))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub fn fetch_json(&self, endpoint: &str, options: &RequestOptions) -> ApiResult<Value> {
        let result = self.fetch_json_inner(endpoint, options);
        if let Err(err) = &result {
            error!(endpoint, error = %err, "lichess api fetch error");
        }
        result
    }

    fn fetch_json_inner(&self, endpoint: &str, options: &RequestOptions) -> ApiResult<Value> {
        let url = self.url_for(endpoint);
        let headers = merge_headers(&options.headers)?;
        debug!(method = %options.method, %url, "lichess request");

        let resp = self
            .http
            .request(options.method.clone(), &url)
            .headers(headers)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Remote {
                status: Some(status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }

        let body = resp.text()?;
        parse_json_body(&body)
    }

    fn fetch_typed<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let value = self.fetch_json(endpoint, &RequestOptions::default())?;
        decode(value, endpoint)
    }

    fn fetch_list<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<Vec<T>> {
        let value = self.fetch_json(endpoint, &RequestOptions::default())?;
        decode_list(value, endpoint)
    }

    pub fn user_profile(&self, username: &str) -> ApiResult<UserProfile> {
        let username = require_identifier(username, "Username")?;
        self.fetch_typed(&user_path(username))
    }

    pub fn rating_history(&self, username: &str) -> ApiResult<Vec<RatingSeries>> {
        let username = require_identifier(username, "Username")?;
        self.fetch_list(&format!("/user/{username}/rating-history"))
    }

    pub fn user_games(&self, username: &str, query: &GamesQuery) -> ApiResult<Vec<GameSummary>> {
        let username = require_identifier(username, "Username")?;
        self.fetch_list(&games_path(username, query))
    }

    pub fn leaderboard(&self, variant: Variant, nb: u32) -> ApiResult<Vec<LeaderboardEntry>> {
        let value = self.fetch_json(
            &format!("/player/top/{nb}/{}", variant.key()),
            &RequestOptions::default(),
        )?;
        parse_leaderboard_value(value)
    }

    pub fn tournaments(&self) -> ApiResult<TournamentList> {
        self.fetch_typed("/tournament")
    }

    pub fn tournament(&self, id: &str) -> ApiResult<Tournament> {
        let id = require_identifier(id, "Tournament ID")?;
        self.fetch_typed(&format!("/tournament/{id}"))
    }

    pub fn tournament_results(&self, id: &str, nb: u32) -> ApiResult<Vec<TournamentResult>> {
        let id = require_identifier(id, "Tournament ID")?;
        self.fetch_list(&format!("/tournament/{id}/results?nb={nb}"))
    }
}

pub fn user_path(username: &str) -> String {
    format!("/user/{username}")
}

pub fn games_path(username: &str, query: &GamesQuery) -> String {
    format!(
        "/games/user/{username}?max={}&rated={}",
        query.max, query.rated
    )
}

fn require_identifier<'a>(raw: &'a str, what: &'static str) -> ApiResult<&'a str> {
    if raw.trim().is_empty() {
        return Err(ApiError::MissingIdentifier(what));
    }
    Ok(raw)
}

fn merge_headers(extra: &[(String, String)]) -> ApiResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MIME));
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| ApiError::remote(format!("invalid header name {name}: {err}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| ApiError::remote(format!("invalid header value: {err}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

// One JSON document, or NDJSON collected into an array.
pub fn parse_json_body(raw: &str) -> ApiResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let mut items = Vec::new();
    for line in trimmed.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let value = serde_json::from_str::<Value>(line)
            .map_err(|err| ApiError::remote(format!("invalid json body: {err}")))?;
        items.push(value);
    }
    Ok(Value::Array(items))
}

pub fn parse_list_json<T: DeserializeOwned>(raw: &str) -> ApiResult<Vec<T>> {
    decode_list(parse_json_body(raw)?, "list")
}

pub fn parse_leaderboard_json(raw: &str) -> ApiResult<Vec<LeaderboardEntry>> {
    parse_leaderboard_value(parse_json_body(raw)?)
}

pub fn parse_leaderboard_value(value: Value) -> ApiResult<Vec<LeaderboardEntry>> {
    match value {
        Value::Object(mut map) => match map.remove("users") {
            Some(users) => decode_list(users, "leaderboard"),
            None => Ok(Vec::new()),
        },
        other => decode_list(other, "leaderboard"),
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> ApiResult<T> {
    serde_json::from_value(value)
        .map_err(|err| ApiError::remote(format!("unexpected {what} payload: {err}")))
}

fn decode_list<T: DeserializeOwned>(value: Value, what: &str) -> ApiResult<Vec<T>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => decode(value, what),
        single => Ok(vec![decode(single, what)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndjson_body_becomes_array() {
        let raw = "{\"id\":\"a\"}\n{\"id\":\"b\"}\n";
        let value = parse_json_body(raw).expect("ndjson should parse");
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn broken_body_is_remote_error() {
        let err = parse_json_body("{\"id\":").unwrap_err();
        assert!(matches!(err, ApiError::Remote { status: None, .. }));
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_json_body("  ").expect("empty ok"), Value::Null);
    }

    #[test]
    fn caller_header_overrides_accept() {
        let headers = merge_headers(&[
            ("Accept".to_string(), "application/x-ndjson".to_string()),
            ("X-Trace".to_string(), "1".to_string()),
        ])
        .expect("valid headers");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/x-ndjson");
        assert_eq!(headers.get("x-trace").unwrap(), "1");
    }

    #[test]
    fn default_headers_only_accept_json() {
        let headers = merge_headers(&[]).expect("valid headers");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(ACCEPT).unwrap(), JSON_MIME);
    }

    #[test]
    fn blank_identifier_is_rejected() {
        assert!(matches!(
            require_identifier("   ", "Username"),
            Err(ApiError::MissingIdentifier("Username"))
        ));
        assert_eq!(require_identifier("magnus", "Username").unwrap(), "magnus");
    }

    #[test]
    fn identifier_is_passed_through_untrimmed() {
        assert_eq!(require_identifier(" magnus", "Username").unwrap(), " magnus");
    }

    #[test]
    fn games_path_carries_query() {
        let path = games_path(
            "DrNykterstein",
            &GamesQuery {
                max: 5,
                rated: false,
            },
        );
        assert_eq!(path, "/games/user/DrNykterstein?max=5&rated=false");
        assert_eq!(user_path("DrNykterstein"), "/user/DrNykterstein");
    }

    #[test]
    fn leaderboard_accepts_wrapped_and_bare() {
        let wrapped = serde_json::json!({"users": [{"username": "a"}, {"username": "b"}]});
        assert_eq!(parse_leaderboard_value(wrapped).unwrap().len(), 2);
        let bare = serde_json::json!([{"username": "a"}]);
        assert_eq!(parse_leaderboard_value(bare).unwrap().len(), 1);
    }
}
