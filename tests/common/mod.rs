#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use vereinonline_client_rs::{
    Client, Error, HttpBackend, HttpRequest, HttpResponse, Result, Route, TemplateName,
};

pub const BASE_URL: &str = "https://www.vereinonline.org/testverein/";

type Handler = dyn Fn(&HttpRequest) -> Option<HttpResponse> + Send + Sync;

/// In-memory backend that records every request it receives.
#[derive(Clone)]
pub struct MockBackend {
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockBackend {
    pub fn scripted(responses: Vec<HttpResponse>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::with_handler(move |_| queue.lock().unwrap().pop_front())
    }

    pub fn with_handler(
        handler: impl Fn(&HttpRequest) -> Option<HttpResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpBackend for MockBackend {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(&request)
            .ok_or_else(|| Error::Network(format!("no response scripted for {}", request.url)))
    }
}

pub fn client_with(backend: &MockBackend) -> Client {
    Client::builder(BASE_URL)
        .backend(backend.clone())
        .build()
        .unwrap()
}

pub fn response(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> HttpResponse {
    let mut headers = HeaderMap::new();
    if let Some(ct) = content_type {
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
    }
    HttpResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
        body: body.into(),
    }
}

pub fn json(body: &str) -> HttpResponse {
    response(200, Some("application/json"), body)
}

pub fn html(body: &str) -> HttpResponse {
    response(200, Some("text/html; charset=utf-8"), body)
}

pub fn redirect(location: &str) -> HttpResponse {
    let mut resp = response(302, None, Vec::new());
    resp.headers
        .insert(LOCATION, HeaderValue::from_str(location).unwrap());
    resp
}

pub fn query(request: &HttpRequest, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn body_contains(request: &HttpRequest, needle: &[u8]) -> bool {
    request
        .body
        .as_deref()
        .is_some_and(|body| body.windows(needle.len()).any(|w| w == needle))
}

/// Admin page listing every template of `T`, with `active` selected.
pub fn template_page<T: TemplateName>(
    active: Route,
    extra_hrefs: &[&str],
    subject: Option<&str>,
    body: &str,
) -> String {
    let mut items = String::new();
    for name in T::ALL {
        let route = name.route();
        let class = if route == active { r#" class="active""# } else { "" };
        items.push_str(&format!(
            r#"<li{class}><a href="?action={}&amp;cmd={}">{}</a></li>"#,
            route.action,
            route.cmd,
            name.as_str()
        ));
    }
    for href in extra_hrefs {
        items.push_str(&format!(
            r#"<li><a href="{}">Extra</a></li>"#,
            href.replace('&', "&amp;")
        ));
    }
    let subject_input = subject
        .map(|s| format!(r#"<input type="text" name="subject" value="{s}">"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
<div class="registerline">Mailvorlagen</div>
<ul><li>Gruppe<ul>{items}</ul></li></ul>
<form id="form1" method="post">{subject_input}<textarea name="werte">{body}</textarea></form>
</body></html>"#
    )
}
