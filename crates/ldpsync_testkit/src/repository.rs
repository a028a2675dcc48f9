//! An in-memory LDP repository.

use crate::fixtures::{sha256_hex, REPOSITORY_BASE};
use bytes::Bytes;
use ldpsync_graph::{parse_jsonld, to_jsonld_bytes, vocab, Graph, Term, JSONLD_CONTENT_TYPE};
use ldpsync_protocol::{
    header, ContentDigest, DigestAlgorithm, HttpClient, HttpRequest, HttpResponse, LinkRelations,
    Method, TransportError,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

const DESCRIPTION_SUFFIX: &str = "/fcr:metadata";
const VERSIONS_SUFFIX: &str = "/fcr:versions";
const EXTERNAL_CONTENT: &str = "http://fedora.info/definitions/fcrepo#ExternalContent";
const FEDORA_CREATED: &str = "http://fedora.info/definitions/v4/repository#created";
const FEDORA_LAST_MODIFIED: &str = "http://fedora.info/definitions/v4/repository#lastModified";

#[derive(Debug, Clone)]
enum Content {
    Rdf(Graph),
    Binary { bytes: Bytes, content_type: String },
    External { url: String, content_type: String },
}

#[derive(Debug, Clone)]
struct Stored {
    content: Content,
    etag: u64,
    versions: usize,
}

#[derive(Debug, Default)]
struct RepositoryState {
    resources: BTreeMap<String, Stored>,
    tombstones: BTreeSet<String>,
    next_etag: u64,
    binary_uploads: usize,
    writes: usize,
    bump_after_read: BTreeSet<String>,
    hidden_describedby: BTreeSet<String>,
    versioning_disabled: bool,
    injected: VecDeque<u16>,
}

/// An in-memory repository with LDP and Fedora-style semantics.
///
/// - Every write assigns a fresh `ETag`; `If-Match` and `If-None-Match: *`
///   are enforced with 412
/// - Binaries get an RDF description at `{uri}/fcr:metadata`, linked with
///   `rel="describedby"`
/// - Deleted resources leave a tombstone answering 410
/// - Reads add server-managed triples the synchronizer must not write back
#[derive(Debug)]
pub struct FakeRepository {
    base: String,
    state: Mutex<RepositoryState>,
}

impl Default for FakeRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRepository {
    /// Creates an empty repository at [`REPOSITORY_BASE`].
    pub fn new() -> Self {
        Self::with_base(REPOSITORY_BASE)
    }

    /// Creates an empty repository at `base`.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            state: Mutex::new(RepositoryState::default()),
        }
    }

    /// Repository root.
    pub fn base(&self) -> &str {
        &self.base
    }

    // -- fault hooks --

    /// Changes a resource's `ETag` as if another writer had touched it.
    pub fn bump_token(&self, uri: &str) {
        self.state.lock().bump(uri);
    }

    /// Bumps the `ETag` right after the next successful `GET` of `uri`.
    pub fn bump_token_after_read(&self, uri: &str) {
        self.state.lock().bump_after_read.insert(uri.to_string());
    }

    /// Stops advertising the `describedby` link of a binary.
    pub fn remove_describedby(&self, uri: &str) {
        self.state.lock().hidden_describedby.insert(uri.to_string());
    }

    /// Stops advertising and accepting version requests.
    pub fn disable_versioning(&self) {
        self.state.lock().versioning_disabled = true;
    }

    /// Answers the next request with `status`.
    pub fn fail_next(&self, status: u16) {
        self.state.lock().injected.push_back(status);
    }

    // -- inspection --

    /// Number of accepted binary uploads.
    pub fn binary_uploads(&self) -> usize {
        self.state.lock().binary_uploads
    }

    /// Number of accepted writes of any kind.
    pub fn writes(&self) -> usize {
        self.state.lock().writes
    }

    /// Returns true if a live resource exists at `uri`.
    pub fn contains(&self, uri: &str) -> bool {
        self.state.lock().resources.contains_key(uri)
    }

    /// Returns true if `uri` was deleted.
    pub fn is_tombstoned(&self, uri: &str) -> bool {
        self.state.lock().tombstones.contains(uri)
    }

    /// The stored graph of an RDF resource.
    pub fn graph(&self, uri: &str) -> Option<Graph> {
        match &self.state.lock().resources.get(uri)?.content {
            Content::Rdf(graph) => Some(graph.clone()),
            _ => None,
        }
    }

    /// The stored bytes of a binary.
    pub fn binary(&self, uri: &str) -> Option<Bytes> {
        match &self.state.lock().resources.get(uri)?.content {
            Content::Binary { bytes, .. } => Some(bytes.clone()),
            _ => None,
        }
    }

    /// The external URL a binary points at.
    pub fn external_url(&self, uri: &str) -> Option<String> {
        match &self.state.lock().resources.get(uri)?.content {
            Content::External { url, .. } => Some(url.clone()),
            _ => None,
        }
    }

    /// Current `ETag` value, unquoted.
    pub fn token(&self, uri: &str) -> Option<String> {
        self.state
            .lock()
            .resources
            .get(uri)
            .map(|s| s.etag.to_string())
    }

    /// Number of versions taken of `uri`.
    pub fn version_count(&self, uri: &str) -> usize {
        self.state
            .lock()
            .resources
            .get(uri)
            .map_or(0, |s| s.versions)
    }

    /// Stores an RDF resource without counting it as a write.
    pub fn seed_rdf(&self, uri: &str, graph: Graph) {
        let mut state = self.state.lock();
        let etag = state.fresh_etag();
        state.resources.insert(
            uri.to_string(),
            Stored {
                content: Content::Rdf(graph),
                etag,
                versions: 0,
            },
        );
    }

    /// Handles one request.
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let mut state = self.state.lock();
        if let Some(status) = state.injected.pop_front() {
            return HttpResponse::new(status).with_body("injected failure");
        }

        let uri = request.url.as_str();
        match request.method {
            Method::Head => state.read(uri, false),
            Method::Get => {
                let response = state.read(uri, true);
                if response.is_success() && state.bump_after_read.remove(uri) {
                    state.bump(uri);
                }
                response
            }
            Method::Put => state.put(uri, request),
            Method::Delete => state.delete(uri),
            Method::Post => state.post(uri),
            Method::Patch => HttpResponse::new(405),
        }
    }
}

impl HttpClient for FakeRepository {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(self.handle(&request))
    }
}

impl RepositoryState {
    fn fresh_etag(&mut self) -> u64 {
        self.next_etag += 1;
        self.next_etag
    }

    fn bump(&mut self, uri: &str) {
        let etag = self.fresh_etag();
        if let Some(stored) = self.resources.get_mut(uri) {
            stored.etag = etag;
        }
    }

    fn read(&self, uri: &str, with_body: bool) -> HttpResponse {
        if self.tombstones.contains(uri) {
            return HttpResponse::new(410).with_body(format!("{} has been deleted", uri));
        }
        let Some(stored) = self.resources.get(uri) else {
            return HttpResponse::new(404);
        };

        let mut response =
            HttpResponse::new(200).with_header(header::ETAG, format!("\"{}\"", stored.etag));
        let description_of = uri.strip_suffix(DESCRIPTION_SUFFIX);
        if description_of.is_none() && !self.versioning_disabled {
            response = response
                .with_header(
                    header::LINK,
                    format!("<{}{}>; rel=\"timemap\"", uri, VERSIONS_SUFFIX),
                )
                .with_header(
                    header::LINK,
                    "<http://mementoweb.org/ns#OriginalResource>; rel=\"type\"",
                );
        }

        match &stored.content {
            Content::Rdf(graph) => {
                response = response
                    .with_header(header::CONTENT_TYPE, JSONLD_CONTENT_TYPE)
                    .with_header(
                        header::LINK,
                        "<http://www.w3.org/ns/ldp#RDFSource>; rel=\"type\"",
                    );
                if let Some(binary) = description_of {
                    response = response
                        .with_header(header::LINK, format!("<{}>; rel=\"describes\"", binary));
                }
                if with_body {
                    let subject = description_of.unwrap_or(uri);
                    let mut served = graph.clone();
                    served.insert(subject, FEDORA_CREATED, Term::literal("2020-01-01T00:00:00Z"));
                    served.insert(
                        subject,
                        FEDORA_LAST_MODIFIED,
                        Term::literal(format!("etag-{}", stored.etag)),
                    );
                    match to_jsonld_bytes(&served) {
                        Ok(body) => response = response.with_body(body),
                        Err(e) => return HttpResponse::new(500).with_body(e.to_string()),
                    }
                }
            }
            Content::Binary {
                bytes,
                content_type,
            } => {
                response = response
                    .with_header(header::CONTENT_TYPE, content_type.as_str())
                    .with_header(header::CONTENT_LENGTH, bytes.len().to_string())
                    .with_header(header::DIGEST, format!("sha-256={}", sha256_hex(bytes)))
                    .with_header(
                        header::LINK,
                        "<http://www.w3.org/ns/ldp#NonRDFSource>; rel=\"type\"",
                    );
                if !self.hidden_describedby.contains(uri) {
                    response = response.with_header(
                        header::LINK,
                        format!("<{}{}>; rel=\"describedby\"", uri, DESCRIPTION_SUFFIX),
                    );
                }
                if with_body {
                    response = response.with_body(bytes.clone());
                }
            }
            Content::External { content_type, .. } => {
                response = response
                    .with_header(header::CONTENT_TYPE, content_type.as_str())
                    .with_header(
                        header::LINK,
                        "<http://www.w3.org/ns/ldp#NonRDFSource>; rel=\"type\"",
                    );
                if !self.hidden_describedby.contains(uri) {
                    response = response.with_header(
                        header::LINK,
                        format!("<{}{}>; rel=\"describedby\"", uri, DESCRIPTION_SUFFIX),
                    );
                }
            }
        }
        response
    }

    fn put(&mut self, uri: &str, request: &HttpRequest) -> HttpResponse {
        if uri.ends_with(VERSIONS_SUFFIX) {
            return HttpResponse::new(405);
        }
        if self.tombstones.contains(uri) {
            return HttpResponse::new(410).with_body(format!("{} has been deleted", uri));
        }

        let current = self.resources.get(uri).map(|s| s.etag);
        if request.header_value(header::IF_NONE_MATCH) == Some("*") && current.is_some() {
            return HttpResponse::new(412).with_body(format!("{} already exists", uri));
        }
        if let Some(expected) = request.header_value(header::IF_MATCH) {
            let expected = expected.trim().trim_start_matches("W/").trim_matches('"');
            if current.map(|etag| etag.to_string()).as_deref() != Some(expected) {
                return HttpResponse::new(412).with_body(format!("ETag mismatch on {}", uri));
            }
        }

        let description_of = uri.strip_suffix(DESCRIPTION_SUFFIX);
        if description_of.is_some() && current.is_none() {
            return HttpResponse::new(404);
        }

        let content = match self.content_of(uri, description_of, request) {
            Ok(content) => content,
            Err(response) => return response,
        };
        let is_binary = !matches!(content, Content::Rdf(_));
        if matches!(content, Content::Binary { .. }) {
            self.binary_uploads += 1;
        }

        let etag = self.fresh_etag();
        let versions = self.resources.get(uri).map_or(0, |s| s.versions);
        self.resources.insert(
            uri.to_string(),
            Stored {
                content,
                etag,
                versions,
            },
        );
        self.writes += 1;

        if is_binary {
            let description = format!("{}{}", uri, DESCRIPTION_SUFFIX);
            if current.is_none() {
                let mut graph = Graph::new();
                graph.ensure_subject(uri);
                let etag = self.fresh_etag();
                self.resources.insert(
                    description,
                    Stored {
                        content: Content::Rdf(graph),
                        etag,
                        versions: 0,
                    },
                );
            } else {
                self.bump(&description);
            }
        }

        if current.is_none() {
            HttpResponse::new(201)
                .with_header(header::LOCATION, uri)
                .with_header(header::ETAG, format!("\"{}\"", etag))
                .with_body(uri.to_string())
        } else {
            HttpResponse::new(204).with_header(header::ETAG, format!("\"{}\"", etag))
        }
    }

    fn content_of(
        &self,
        uri: &str,
        description_of: Option<&str>,
        request: &HttpRequest,
    ) -> Result<Content, HttpResponse> {
        let links = LinkRelations::parse(
            request
                .headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case(header::LINK))
                .map(|(_, v)| v.as_str()),
        );
        if let Some(link) = links.iter().find(|l| l.rel == EXTERNAL_CONTENT) {
            return Ok(Content::External {
                url: link.target.clone(),
                content_type: link
                    .param("type")
                    .unwrap_or("application/octet-stream")
                    .to_string(),
            });
        }

        let body = request.body.clone().unwrap_or_default();
        let content_type = request
            .header_value(header::CONTENT_TYPE)
            .unwrap_or("application/octet-stream");

        if content_type.starts_with(JSONLD_CONTENT_TYPE) {
            let mut graph = parse_jsonld(&body)
                .map_err(|e| HttpResponse::new(400).with_body(e.to_string()))?;
            let subject = description_of.unwrap_or(uri);
            let fragments = format!("{}#", subject);
            if let Some(foreign) = graph
                .subjects()
                .find(|s| *s != subject && !s.starts_with(&fragments) && !s.starts_with("_:"))
            {
                return Err(HttpResponse::new(409)
                    .with_body(format!("foreign subject {} in body for {}", foreign, uri)));
            }
            for predicate in vocab::REPOSITORY_MANAGED {
                graph.remove_predicate(predicate);
            }
            return Ok(Content::Rdf(graph));
        }

        if description_of.is_some() {
            return Err(HttpResponse::new(415).with_body("descriptions must be RDF"));
        }

        if let Some(digest) = request.header_value(header::DIGEST) {
            let digest = ContentDigest::parse_header(digest)
                .map_err(|e| HttpResponse::new(400).with_body(e.to_string()))?;
            if digest.algorithm == DigestAlgorithm::Sha256 && digest.value != sha256_hex(&body) {
                return Err(HttpResponse::new(409).with_body("digest mismatch"));
            }
        }
        Ok(Content::Binary {
            bytes: body,
            content_type: content_type.to_string(),
        })
    }

    fn delete(&mut self, uri: &str) -> HttpResponse {
        if self.tombstones.contains(uri) {
            return HttpResponse::new(410).with_body(format!("{} has been deleted", uri));
        }
        if self.resources.remove(uri).is_none() {
            return HttpResponse::new(404);
        }
        self.resources.remove(&format!("{}{}", uri, DESCRIPTION_SUFFIX));
        self.tombstones.insert(uri.to_string());
        self.writes += 1;
        HttpResponse::new(204)
    }

    fn post(&mut self, uri: &str) -> HttpResponse {
        let Some(original) = uri.strip_suffix(VERSIONS_SUFFIX) else {
            return HttpResponse::new(405);
        };
        if self.versioning_disabled {
            return HttpResponse::new(405).with_body("versioning is disabled");
        }
        let Some(stored) = self.resources.get_mut(original) else {
            return HttpResponse::new(404);
        };
        stored.versions += 1;
        let memento = format!("{}/{}", uri, stored.versions);
        HttpResponse::new(201).with_header(header::LOCATION, memento)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> String {
        format!("{}/ab/cd", REPOSITORY_BASE)
    }

    fn rdf_put(uri: &str, body: String) -> HttpRequest {
        HttpRequest::new(Method::Put, uri)
            .header(header::CONTENT_TYPE, JSONLD_CONTENT_TYPE)
            .body(body)
    }

    #[test]
    fn conditional_create_then_update() {
        let repo = FakeRepository::new();
        let body = format!(r#"[{{"@id": "{}"}}]"#, uri());

        let created = repo.handle(&rdf_put(&uri(), body.clone()).header("If-None-Match", "*"));
        assert_eq!(created.status, 201);

        let again = repo.handle(&rdf_put(&uri(), body.clone()).header("If-None-Match", "*"));
        assert_eq!(again.status, 412);

        let token = repo.token(&uri()).unwrap();
        let updated = repo.handle(&rdf_put(&uri(), body.clone()).header("If-Match", format!("\"{}\"", token)));
        assert_eq!(updated.status, 204);

        let stale = repo.handle(&rdf_put(&uri(), body).header("If-Match", format!("\"{}\"", token)));
        assert_eq!(stale.status, 412);
    }

    #[test]
    fn rejects_foreign_subjects() {
        let repo = FakeRepository::new();
        let response = repo.handle(&rdf_put(&uri(), r#"[{"@id": "http://elsewhere"}]"#.into()));
        assert_eq!(response.status, 409);
    }

    #[test]
    fn binary_gets_description() {
        let repo = FakeRepository::new();
        let response = repo.handle(
            &HttpRequest::new(Method::Put, uri())
                .header(header::CONTENT_TYPE, "text/plain")
                .body("abc"),
        );
        assert_eq!(response.status, 201);
        assert_eq!(repo.binary_uploads(), 1);

        let head = repo.handle(&HttpRequest::new(Method::Head, uri()));
        let links = LinkRelations::parse(head.header_values(header::LINK));
        assert_eq!(
            links.find("describedby").map(str::to_string),
            Some(format!("{}/fcr:metadata", uri()))
        );
        assert!(head.header(header::DIGEST).is_some());
        assert!(repo.contains(&format!("{}/fcr:metadata", uri())));
    }

    #[test]
    fn digest_mismatch_is_conflict() {
        let repo = FakeRepository::new();
        let response = repo.handle(
            &HttpRequest::new(Method::Put, uri())
                .header(header::DIGEST, "sha-256=00")
                .body("abc"),
        );
        assert_eq!(response.status, 409);
        assert_eq!(repo.binary_uploads(), 0);
    }

    #[test]
    fn delete_leaves_tombstone() {
        let repo = FakeRepository::new();
        repo.seed_rdf(&uri(), Graph::new());
        let delete = || repo.handle(&HttpRequest::new(Method::Delete, uri())).status;
        assert_eq!(delete(), 204);
        assert_eq!(delete(), 410);
        assert_eq!(
            repo.handle(&HttpRequest::new(Method::Get, uri())).status,
            410
        );
    }

    #[test]
    fn reads_add_managed_triples() {
        let repo = FakeRepository::new();
        let mut graph = Graph::new();
        graph.insert(uri(), "http://p", Term::literal("v"));
        repo.seed_rdf(&uri(), graph);

        let response = repo.handle(&HttpRequest::new(Method::Get, uri()));
        let served = parse_jsonld(&response.body).unwrap();
        assert!(served.first_value(&uri(), FEDORA_CREATED).is_some());
        assert!(repo
            .graph(&uri())
            .unwrap()
            .first_value(&uri(), FEDORA_CREATED)
            .is_none());
    }

    #[test]
    fn injected_failure() {
        let repo = FakeRepository::new();
        repo.fail_next(503);
        assert_eq!(repo.handle(&HttpRequest::new(Method::Head, uri())).status, 503);
        assert_eq!(repo.handle(&HttpRequest::new(Method::Head, uri())).status, 404);
    }
}
