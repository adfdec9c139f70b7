use crate::backend::{HttpBackend, HttpRequest, HttpResponse, ReqwestBackend};
use crate::cancel::CancellationReceiver;
use crate::codec::{self, Charset};
use crate::constants::*;
use crate::error::{Error, Result};
use crate::groups::GroupsApi;
use crate::members::MembersApi;
use crate::models::Config;
use crate::multipart::MultipartForm;
use crate::repair::{repair, repair_str};
use crate::templates::MailTemplates;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, LOCATION},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Session token accepted by the server: `A/<user>/<md5(password) as hex>`.
pub fn generate_token(username: &str, password: &str) -> String {
    format!("A/{}/{:x}", username, md5::compute(password.as_bytes()))
}

/// Body of a JSON API request.
#[derive(Debug, Clone)]
pub enum JsonBody {
    /// Sent verbatim as `text/plain`.
    Text(String),
    /// Serialized as `application/json`.
    Json(Value),
}

#[derive(Debug, Clone)]
pub struct JsonRequest {
    pub method: Method,
    pub body: Option<JsonBody>,
}

impl JsonRequest {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: None,
        }
    }

    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(JsonBody::Json(body)),
        }
    }

    pub fn post_text(body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            body: Some(JsonBody::Text(body.into())),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

impl Default for JsonRequest {
    fn default() -> Self {
        Self::get()
    }
}

/// Body of an HTML admin request. Text content is encoded with the
/// request's charset.
#[derive(Debug, Clone)]
pub enum HtmlBody {
    Text(String),
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    Multipart(MultipartForm),
    Json(Value),
}

#[derive(Debug, Clone)]
pub struct HtmlRequest {
    pub method: Method,
    /// Extra query parameters; they replace existing parameters of the same name.
    pub params: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<HtmlBody>,
    /// Charset for the request body. Defaults to UTF-8.
    pub charset: Option<String>,
    pub cancel: Option<CancellationReceiver>,
}

impl HtmlRequest {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            params: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            charset: None,
            cancel: None,
        }
    }

    pub fn post(body: HtmlBody) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::get()
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn cancel(mut self, cancel: CancellationReceiver) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

impl Default for HtmlRequest {
    fn default() -> Self {
        Self::get()
    }
}

pub struct ClientBuilder {
    config: Config,
    backend: Option<Arc<dyn HttpBackend>>,
}

impl ClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: Config::new(base_url),
            backend: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn repair_double_encoding(mut self, enabled: bool) -> Self {
        self.config.repair_double_encoding = enabled;
        self
    }

    /// Replaces the reqwest backend, e.g. with a recording fake in tests.
    pub fn backend(mut self, backend: impl HttpBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    pub fn build(self) -> Result<Client> {
        let base_url = Url::parse(&self.config.base_url)?;
        let backend = match self.backend {
            Some(backend) => backend,
            None => Arc::new(ReqwestBackend::new(&self.config)?),
        };
        Ok(Client {
            base_url,
            config: self.config,
            backend,
            token: None,
        })
    }
}

/// Client for one association's VereinOnline instance.
///
/// Holds a single session token. `login` and `logout` need exclusive
/// access; requests only read the token and may run concurrently.
pub struct Client {
    base_url: Url,
    config: Config,
    backend: Arc<dyn HttpBackend>,
    token: Option<String>,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Derives the session token and, if `verify` is set, checks it against
    /// the `VerifyLogin` endpoint. A failed check leaves the client logged out.
    pub async fn login(&mut self, username: &str, password: &str, verify: bool) -> Result<()> {
        self.token = Some(generate_token(username, password));
        if !verify {
            return Ok(());
        }

        if let Err(err) = self.verify_login(username, password).await {
            self.token = None;
            return Err(Error::Login(Box::new(err)));
        }
        debug!(user = username, "login verified");
        Ok(())
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    async fn verify_login(&self, username: &str, password: &str) -> Result<()> {
        let body = json!({
            "user": username,
            "password": password,
            "result": "id",
        });
        let result = self
            .fetch_json_value(VERIFY_LOGIN_ENDPOINT, JsonRequest::post_json(body))
            .await?;
        match result.as_array() {
            Some(items) if items.first().is_some_and(is_truthy) => Ok(()),
            Some(_) => Err(Error::Auth("invalid username or password".into())),
            None => Err(Error::Malformed(format!(
                "{VERIFY_LOGIN_ENDPOINT} returned an object instead of an array"
            ))),
        }
    }

    /// Calls `?api=<endpoint>` and deserializes the repaired payload.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: JsonRequest,
    ) -> Result<T> {
        let value = self.fetch_json_value(endpoint, request).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::Malformed(format!("unexpected payload for {endpoint}: {e}")))
    }

    pub async fn fetch_json_value(&self, endpoint: &str, request: JsonRequest) -> Result<Value> {
        let mut url = self.base_url.clone();
        set_query_param(&mut url, API_PARAM, endpoint);
        self.attach_token(&mut url);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        let body = match request.body {
            None => None,
            Some(JsonBody::Text(text)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
                Some(text.into_bytes())
            }
            Some(JsonBody::Json(value)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                Some(serde_json::to_vec(&value)?)
            }
        };

        let request = HttpRequest {
            method: request.method,
            url,
            headers,
            body,
        };
        let resp = self.send(request, None).await?;
        if !resp.status.is_success() {
            return Err(Error::Status {
                status: resp.status,
                body: resp.text_lossy(),
            });
        }

        let value: Value = serde_json::from_slice(&resp.body)
            .map_err(|e| Error::Malformed(format!("invalid JSON from {endpoint}: {e}")))?;
        match &value {
            Value::Object(map) => {
                if let Some(err) = map.get("error") {
                    return Err(Error::Remote(error_message(err)));
                }
            }
            Value::Array(_) => {}
            other => {
                return Err(Error::Malformed(format!(
                    "expected an object or array, got {}",
                    json_kind(other)
                )))
            }
        }

        if self.config.repair_double_encoding {
            Ok(repair(value))
        } else {
            Ok(value)
        }
    }

    /// Requests an admin page relative to the base URL and returns the
    /// decoded HTML. `302` responses are followed with a plain `GET` that
    /// carries the session token again.
    pub async fn fetch_html(&self, path: &str, request: HtmlRequest) -> Result<String> {
        let mut url = self.base_url.join(path)?;
        self.attach_token(&mut url);
        for (key, value) in &request.params {
            set_query_param(&mut url, key, value);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.extend(request.headers);

        let charset = Charset::resolve_for_encoding(request.charset.as_deref());
        let body = match request.body {
            None => None,
            Some(HtmlBody::Text(text)) => {
                let content_type = format!("text/plain; charset={}", charset.label());
                headers.insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
                Some(charset.encode(&text))
            }
            Some(HtmlBody::Form(pairs)) => {
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                Some(encode_form(&pairs, &charset))
            }
            Some(HtmlBody::Multipart(form)) => {
                let built = form.build(&charset);
                headers.insert(CONTENT_TYPE, HeaderValue::from_str(&built.content_type)?);
                Some(built.bytes)
            }
            Some(HtmlBody::Json(value)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                Some(charset.encode(&serde_json::to_string(&value)?))
            }
        };

        let http_request = HttpRequest {
            method: request.method,
            url,
            headers,
            body,
        };
        let resp = self
            .send_following_redirects(http_request, request.cancel.as_ref())
            .await?;

        let text = codec::response_charset(resp.header("content-type")).decode(&resp.body);
        if !resp.status.is_success() {
            return Err(Error::Status {
                status: resp.status,
                body: text,
            });
        }
        if text.is_empty() {
            return Err(Error::Malformed("no data received from the server".into()));
        }
        if let Some(message) = html_error_envelope(&text) {
            return Err(Error::Remote(message));
        }
        Ok(text)
    }

    /// Mail template categories of this instance.
    pub fn mail_templates(&self) -> MailTemplates<'_> {
        MailTemplates::new(self)
    }

    pub fn members(&self) -> MembersApi<'_> {
        MembersApi::new(self)
    }

    pub fn groups(&self) -> GroupsApi<'_> {
        GroupsApi::new(self)
    }

    fn attach_token(&self, url: &mut Url) {
        if let Some(token) = &self.token {
            set_query_param(url, TOKEN_PARAM, token);
        }
    }

    async fn send_following_redirects(
        &self,
        mut request: HttpRequest,
        cancel: Option<&CancellationReceiver>,
    ) -> Result<HttpResponse> {
        let max = self.config.max_redirects;
        let mut hops = 0usize;
        loop {
            let mut headers = request.headers.clone();
            let resp = self.send(request, cancel).await?;
            if resp.status != StatusCode::FOUND {
                return Ok(resp);
            }
            let Some(location) = resp.header(LOCATION.as_str()) else {
                return Ok(resp);
            };
            if hops >= max {
                return Err(Error::TooManyRedirects { max });
            }
            hops += 1;

            let mut url = self.base_url.join(location)?;
            self.attach_token(&mut url);
            debug!(hop = hops, location = %redacted(&url), "following redirect");

            headers.remove(CONTENT_TYPE);
            request = HttpRequest {
                method: Method::GET,
                url,
                headers,
                body: None,
            };
        }
    }

    async fn send(
        &self,
        request: HttpRequest,
        cancel: Option<&CancellationReceiver>,
    ) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %redacted(&request.url), "sending request");
        let Some(cancel) = cancel else {
            return self.backend.execute(request).await;
        };
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = self.backend.execute(request) => result,
        }
    }
}

/// Builds a client and logs in with verification.
pub async fn connect(base_url: &str, username: &str, password: &str) -> Result<Client> {
    let mut client = Client::new(base_url)?;
    client.login(username, password, true).await?;
    Ok(client)
}

/// Replaces every `key` parameter of `url` with a single `key=value`.
fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (k, v) in &retained {
        pairs.append_pair(k, v);
    }
    pairs.append_pair(key, value);
}

fn redacted(url: &Url) -> Url {
    if !url.query_pairs().any(|(k, _)| k == TOKEN_PARAM) {
        return url.clone();
    }
    let mut clean = url.clone();
    set_query_param(&mut clean, TOKEN_PARAM, "***");
    clean
}

fn encode_form(pairs: &[(String, String)], charset: &Charset) -> Vec<u8> {
    let encode = |s: &str| -> String {
        url::form_urlencoded::byte_serialize(&charset.encode(s)).collect()
    };
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
        .into_bytes()
}

fn error_message(err: &Value) -> String {
    match err {
        Value::String(s) if !s.is_empty() => repair_str(s),
        v if !is_truthy(v) => "an error occurred while fetching data".to_string(),
        v => v.to_string(),
    }
}

/// An HTML endpoint may answer with a JSON error object instead of a page.
fn html_error_envelope(text: &str) -> Option<String> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    value.as_object()?.get("error").map(error_message)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
