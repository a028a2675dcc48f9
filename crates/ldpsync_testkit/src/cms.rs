//! An in-memory CMS.

use crate::fixtures::{sha256_hex, CMS_BASE};
use bytes::Bytes;
use ldpsync_graph::JSONLD_CONTENT_TYPE;
use ldpsync_protocol::{header, HttpClient, HttpRequest, HttpResponse, Method, TransportError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct CmsState {
    entities: BTreeMap<String, (Value, Option<String>)>,
    files: BTreeMap<String, (Bytes, String)>,
    failures: BTreeMap<String, u16>,
    entity_fetches: usize,
    file_downloads: usize,
    authorizations: Vec<Option<String>>,
}

/// Serves JSON-LD entities, files and file digests.
///
/// Entities are looked up by URL without the query string, so
/// `http://cms.test/node/1?_format=jsonld` finds `http://cms.test/node/1`.
#[derive(Debug)]
pub struct FakeCms {
    base: String,
    state: Mutex<CmsState>,
}

impl Default for FakeCms {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCms {
    /// Creates an empty CMS at [`CMS_BASE`].
    pub fn new() -> Self {
        Self {
            base: CMS_BASE.to_string(),
            state: Mutex::new(CmsState::default()),
        }
    }

    /// CMS root.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Stores or replaces an entity.
    pub fn put_entity(&self, url: &str, jsonld: Value) {
        self.state
            .lock()
            .entities
            .insert(url.to_string(), (jsonld, None));
    }

    /// Stores or replaces a media entity describing `file`.
    pub fn put_media(&self, url: &str, jsonld: Value, file: &str) {
        self.state
            .lock()
            .entities
            .insert(url.to_string(), (jsonld, Some(file.to_string())));
    }

    /// Stores or replaces a file.
    pub fn put_file(&self, url: &str, bytes: impl Into<Bytes>, content_type: &str) {
        self.state
            .lock()
            .files
            .insert(url.to_string(), (bytes.into(), content_type.to_string()));
    }

    /// Makes every request for `url` answer `status`.
    pub fn fail(&self, url: &str, status: u16) {
        self.state.lock().failures.insert(url.to_string(), status);
    }

    /// Undoes [`FakeCms::fail`].
    pub fn recover(&self, url: &str) {
        self.state.lock().failures.remove(url);
    }

    /// Number of entity `GET`s served.
    pub fn entity_fetches(&self) -> usize {
        self.state.lock().entity_fetches
    }

    /// Number of file `GET`s served.
    pub fn file_downloads(&self) -> usize {
        self.state.lock().file_downloads
    }

    /// `Authorization` header of every request, in order.
    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.state.lock().authorizations.clone()
    }

    /// Handles one request.
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let mut state = self.state.lock();
        state.authorizations.push(
            request
                .header_value(header::AUTHORIZATION)
                .map(str::to_string),
        );

        let key = request
            .url
            .split_once('?')
            .map_or(request.url.as_str(), |(path, _)| path);
        if let Some(status) = state.failures.get(key) {
            return HttpResponse::new(*status).with_body("cms failure");
        }

        if let Some((jsonld, describes)) = state.entities.get(key).cloned() {
            let mut response = HttpResponse::new(200).with_header(header::CONTENT_TYPE, JSONLD_CONTENT_TYPE);
            if let Some(file) = describes {
                response =
                    response.with_header(header::LINK, format!("<{}>; rel=\"describes\"", file));
            }
            return match request.method {
                Method::Get => {
                    state.entity_fetches += 1;
                    response.with_body(jsonld.to_string())
                }
                Method::Head => response,
                _ => HttpResponse::new(405),
            };
        }

        if let Some((bytes, content_type)) = state.files.get(key).cloned() {
            let mut response = HttpResponse::new(200)
                .with_header(header::CONTENT_TYPE, content_type)
                .with_header(header::CONTENT_LENGTH, bytes.len().to_string());
            return match request.method {
                Method::Get => {
                    state.file_downloads += 1;
                    response.with_body(bytes)
                }
                Method::Head => {
                    if request.header_value(header::WANT_DIGEST).is_some() {
                        response = response
                            .with_header(header::DIGEST, format!("sha-256={}", sha256_hex(&bytes)));
                    }
                    response
                }
                _ => HttpResponse::new(405),
            };
        }

        HttpResponse::new(404)
    }
}

impl HttpClient for FakeCms {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(self.handle(&request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{file_url, media_jsonld, media_url, T1};

    #[test]
    fn serves_media_with_describes_link() {
        let cms = FakeCms::new();
        cms.put_media(&media_url(1), media_jsonld(&media_url(1), "m", T1), &file_url("a.txt"));

        let response = cms.handle(&HttpRequest::new(
            Method::Get,
            format!("{}?_format=jsonld", media_url(1)),
        ));
        assert_eq!(response.status, 200);
        assert!(response.header(header::LINK).unwrap().contains("describes"));
        assert_eq!(cms.entity_fetches(), 1);
    }

    #[test]
    fn digest_only_when_wanted() {
        let cms = FakeCms::new();
        cms.put_file(&file_url("a.txt"), "abc", "text/plain");

        let plain = cms.handle(&HttpRequest::new(Method::Head, file_url("a.txt")));
        assert!(plain.header(header::DIGEST).is_none());

        let wanted = cms.handle(
            &HttpRequest::new(Method::Head, file_url("a.txt")).header(header::WANT_DIGEST, "sha-256"),
        );
        assert_eq!(
            wanted.header(header::DIGEST),
            Some(format!("sha-256={}", sha256_hex(b"abc")).as_str())
        );
        assert_eq!(cms.file_downloads(), 0);
    }

    #[test]
    fn failures_apply_until_recovered() {
        let cms = FakeCms::new();
        cms.put_file(&file_url("a.txt"), "abc", "text/plain");
        cms.fail(&file_url("a.txt"), 503);
        assert_eq!(cms.handle(&HttpRequest::new(Method::Get, file_url("a.txt"))).status, 503);
        cms.recover(&file_url("a.txt"));
        assert_eq!(cms.handle(&HttpRequest::new(Method::Get, file_url("a.txt"))).status, 200);
    }
}
