//! A fake wiki server for integration tests.
//!
//! Speaks the same protocol as the real one: `GET /<title>?raw=true`,
//! `PUT /<title>` with a `contents` form field, `GET /?long=true` for the page
//! listing, all behind HTTP Basic auth.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;

pub const USERNAME: &str = "me";
pub const PASSWORD: &str = "secret";
/// `Basic base64("me:secret")`.
const EXPECTED_AUTH: &str = "Basic bWU6c2VjcmV0";

#[derive(Clone, Default)]
pub struct FakeWiki {
    pages: Arc<Mutex<BTreeMap<String, String>>>,
    raw_pages: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    locked: Arc<Mutex<HashSet<String>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeWiki {
    pub fn with_pages(pages: &[(&str, &str)]) -> Self {
        let wiki = Self::default();
        {
            let mut map = wiki.pages.lock().unwrap();
            for (title, content) in pages {
                map.insert(title.to_string(), content.to_string());
            }
        }
        wiki
    }

    /// Writes to `title` get a 500.
    pub fn lock(&self, title: &str) {
        self.locked.lock().unwrap().insert(title.to_string());
    }

    /// Serve `title` as exactly these bytes, whatever their encoding.
    pub fn set_raw_page(&self, title: &str, bytes: &[u8]) {
        self.raw_pages
            .lock()
            .unwrap()
            .insert(title.to_string(), bytes.to_vec());
    }

    pub fn raw_page(&self, title: &str) -> Option<Vec<u8>> {
        self.raw_pages.lock().unwrap().get(title).cloned()
    }

    pub fn page(&self, title: &str) -> Option<String> {
        self.pages.lock().unwrap().get(title).cloned()
    }

    /// `METHOD title` for every authorised page request, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, method: &str, title: &str) {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{method} {title}"));
    }
}

fn authorised(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == EXPECTED_AUTH)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

async fn list_pages(State(wiki): State<FakeWiki>, headers: HeaderMap) -> Response {
    if !authorised(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let items: String = wiki
        .pages
        .lock()
        .unwrap()
        .iter()
        .map(|(title, content)| {
            format!(
                "<li><a href=\"/{title}\">{}</a> {} bytes</li>\n",
                escape_html(title),
                content.len()
            )
        })
        .collect();
    Html(format!("<html><body><ul id=\"pages\">\n{items}</ul></body></html>")).into_response()
}

async fn read_page(
    State(wiki): State<FakeWiki>,
    Path(title): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorised(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    wiki.record("GET", &title);
    if let Some(bytes) = wiki.raw_page(&title) {
        return bytes.into_response();
    }
    match wiki.page(&title) {
        Some(content) => content.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn write_page(
    State(wiki): State<FakeWiki>,
    Path(title): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !authorised(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    wiki.record("PUT", &title);
    if wiki.locked.lock().unwrap().contains(&title) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let Some(contents) = form.get("contents") else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    wiki.pages
        .lock()
        .unwrap()
        .insert(title, contents.clone());
    StatusCode::OK.into_response()
}

/// Start the fake wiki on a random port, return the port.
pub async fn start_server(wiki: FakeWiki) -> u16 {
    let app = Router::new()
        .route("/", get(list_pages))
        .route("/{*title}", get(read_page).put(write_page))
        .with_state(wiki);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    port
}

/// A port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
