//! Repository Client: conditional reads and writes against the LDP repository.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::exchange::fault;
use bytes::Bytes;
use ldpsync_graph::{modified_marker, parse_jsonld, Graph, RepositoryPayload, JSONLD_CONTENT_TYPE};
use ldpsync_protocol::{
    header, AuthToken, ConcurrencyToken, ContentDigest, FaultKind, HttpClient, HttpRequest,
    HttpResponse, LinkRelations, Method, ModifiedMarker, ResourceLocation, Upstream,
};
use tracing::debug;

/// Relation pointing from a binary to its RDF description.
pub const REL_DESCRIBEDBY: &str = "describedby";
/// Relation pointing at a resource's Memento TimeMap.
pub const REL_TIMEMAP: &str = "timemap";
/// Type advertised by versionable resources in legacy repositories.
pub const MEMENTO_ORIGINAL_RESOURCE: &str = "http://mementoweb.org/ns#OriginalResource";
/// Link relation marking a binary as external content.
pub const EXTERNAL_CONTENT_REL: &str = "http://fedora.info/definitions/fcrepo#ExternalContent";

const PREFER_OMIT_CONTAINMENT: &str = "return=representation; omit=\"http://www.w3.org/ns/ldp#PreferContainment http://www.w3.org/ns/ldp#PreferMembership\"";
const PREFER_LENIENT: &str = "handling=lenient; received=\"minimal\"";

/// What a `HEAD` on a repository resource reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceHead {
    /// False when the repository answered 404.
    pub exists: bool,
    /// Current token, from `ETag`.
    pub token: Option<ConcurrencyToken>,
    /// `Link` relations.
    pub links: LinkRelations,
    /// Binary digest, from `Digest`.
    pub digest: Option<ContentDigest>,
    /// Media type.
    pub content_type: Option<String>,
}

impl ResourceHead {
    /// The description of a binary.
    pub fn described_by(&self) -> Option<&str> {
        self.links.find(REL_DESCRIBEDBY)
    }
}

/// An RDF resource read from the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryResource {
    /// Stored graph.
    pub graph: Graph,
    /// Token to send with the next write.
    pub token: ConcurrencyToken,
    /// Modified marker recorded on the subject.
    pub modified: Option<ModifiedMarker>,
}

/// The body of a `PUT`.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteBody {
    /// An RDF description.
    Rdf(RepositoryPayload),
    /// Binary bytes, with the CMS digest forwarded for verification.
    Binary {
        /// File bytes.
        bytes: Bytes,
        /// Media type.
        content_type: Option<String>,
        /// Digest to forward.
        digest: Option<ContentDigest>,
    },
    /// A pointer to content that stays in the CMS.
    External {
        /// File URL.
        url: String,
        /// Media type.
        content_type: String,
    },
}

/// Result of an accepted `PUT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// True on 201.
    pub created: bool,
    /// `Location` of a created resource.
    pub location: Option<String>,
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

/// Result of an accepted version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReceipt {
    /// Status code.
    pub status: u16,
    /// Location of the new memento.
    pub location: Option<String>,
}

/// Talks to the repository.
///
/// Non-2xx responses become typed `Upstream` variants carrying the original
/// status; 403, 404 and 410 are never collapsed.
#[derive(Debug)]
pub struct RepositoryClient<H: HttpClient> {
    http: H,
    modified_predicate: String,
}

impl<H: HttpClient> RepositoryClient<H> {
    /// Creates a client.
    pub fn new(http: H, config: &SyncConfig) -> Self {
        Self {
            http,
            modified_predicate: config.modified_predicate.clone(),
        }
    }

    fn request(&self, method: Method, url: &str, auth: Option<&AuthToken>) -> HttpRequest {
        HttpRequest::new(method, url)
            .header_opt(header::AUTHORIZATION, auth.map(AuthToken::header_value))
    }

    /// Checks whether a resource exists and reads its headers.
    ///
    /// A 404 is reported as `exists = false`; a 410 is `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedMetadata` if the `Digest` header cannot be parsed.
    pub fn head(
        &self,
        location: &ResourceLocation,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<ResourceHead>> {
        let request = self
            .request(Method::Head, &location.uri(), auth)
            .header(header::WANT_DIGEST, "sha-256");
        let response = send!(self.http, request);
        match response.status {
            404 => return Ok(Upstream::Ok(ResourceHead::default())),
            410 => return Ok(fault(FaultKind::NotFound, &response).into()),
            _ if !response.is_success() => return Ok(fault(FaultKind::Failed, &response).into()),
            _ => {}
        }

        Ok(Upstream::Ok(ResourceHead {
            exists: true,
            token: response
                .header(header::ETAG)
                .and_then(ConcurrencyToken::from_etag),
            links: LinkRelations::parse(response.header_values(header::LINK)),
            digest: response
                .header(header::DIGEST)
                .map(ContentDigest::parse_header)
                .transpose()?,
            content_type: response.header(header::CONTENT_TYPE).map(str::to_string),
        }))
    }

    /// Reads an RDF resource whose subject is its own URI.
    pub fn get(
        &self,
        location: &ResourceLocation,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<RepositoryResource>> {
        self.get_description(location, &location.uri(), auth)
    }

    /// Reads an RDF resource describing `subject`, e.g. a binary's description.
    ///
    /// # Errors
    ///
    /// Returns `MalformedMetadata` if the resource has no `ETag`, its body is
    /// not JSON-LD, or its modified marker cannot be parsed.
    pub fn get_description(
        &self,
        location: &ResourceLocation,
        subject: &str,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<RepositoryResource>> {
        let uri = location.uri();
        let request = self
            .request(Method::Get, &uri, auth)
            .header(header::ACCEPT, JSONLD_CONTENT_TYPE)
            .header(header::PREFER, PREFER_OMIT_CONTAINMENT);
        let response = send!(self.http, request);
        if let Some(upstream) = classify_read(&response) {
            return Ok(upstream);
        }

        let token = response
            .header(header::ETAG)
            .and_then(ConcurrencyToken::from_etag)
            .ok_or_else(|| SyncError::MalformedMetadata(format!("{} has no ETag", uri)))?;
        let graph = parse_jsonld(&response.body)?;
        let modified = modified_marker(&graph, subject, &self.modified_predicate)?;

        debug!(%uri, token = token.as_str(), modified = ?modified, "read repository resource");
        Ok(Upstream::Ok(RepositoryResource {
            graph,
            token,
            modified,
        }))
    }

    /// Writes a resource.
    ///
    /// Without a token the write only succeeds if nothing exists at the
    /// location (`If-None-Match: *`); with one it only succeeds if the token
    /// is still current (`If-Match`).
    pub fn put(
        &self,
        location: &ResourceLocation,
        body: WriteBody,
        token: Option<&ConcurrencyToken>,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<WriteReceipt>> {
        let uri = location.uri();
        let mut request = self.request(Method::Put, &uri, auth);
        request = match token {
            Some(token) => request.header(header::IF_MATCH, token.to_if_match()),
            None => request.header(header::IF_NONE_MATCH, "*"),
        };
        request = match body {
            WriteBody::Rdf(payload) => request
                .header(header::CONTENT_TYPE, payload.content_type)
                .header(header::PREFER, PREFER_LENIENT)
                .body(payload.body),
            WriteBody::Binary {
                bytes,
                content_type,
                digest,
            } => request
                .header(
                    header::CONTENT_TYPE,
                    content_type.as_deref().unwrap_or("application/octet-stream"),
                )
                .header_opt(header::DIGEST, digest.map(|d| d.to_header()).as_deref())
                .body(bytes),
            WriteBody::External { url, content_type } => request.header(
                header::LINK,
                format!(
                    "<{}>; rel=\"{}\"; handling=\"redirect\"; type=\"{}\"",
                    url, EXTERNAL_CONTENT_REL, content_type
                ),
            ),
        };

        let response = send!(self.http, request);
        let created = match response.status {
            201 => true,
            200 | 204 => false,
            409 | 412 => return Ok(fault(FaultKind::Conflict, &response).into()),
            404 | 410 => return Ok(fault(FaultKind::NotFound, &response).into()),
            _ => return Ok(fault(FaultKind::Failed, &response).into()),
        };

        Ok(Upstream::Ok(WriteReceipt {
            created,
            location: if created {
                Some(
                    response
                        .header(header::LOCATION)
                        .map_or_else(|| uri.clone(), str::to_string),
                )
            } else {
                None
            },
            status: response.status,
            body: response.text(),
        }))
    }

    /// Deletes a resource, returning the repository's status.
    pub fn delete(
        &self,
        location: &ResourceLocation,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<u16>> {
        let response = send!(self.http, self.request(Method::Delete, &location.uri(), auth));
        match response.status {
            200 | 204 => Ok(Upstream::Ok(response.status)),
            404 | 410 => Ok(fault(FaultKind::NotFound, &response).into()),
            _ => Ok(fault(FaultKind::Failed, &response).into()),
        }
    }

    /// Snapshots the current state of a resource.
    ///
    /// # Errors
    ///
    /// Returns `Capability` if the resource does not advertise versioning.
    pub fn create_version(
        &self,
        location: &ResourceLocation,
        legacy: bool,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<VersionReceipt>> {
        let uri = location.uri();
        let head = match self.head(location, auth)?.into_result() {
            Ok(head) => head,
            Err(fault) => return Ok(fault.into()),
        };
        if !head.exists {
            return Ok(Upstream::NotFound {
                status: 404,
                message: format!("no resource at {}", uri),
            });
        }

        let target = if legacy {
            if !head.links.has("type", MEMENTO_ORIGINAL_RESOURCE) {
                return Err(SyncError::Capability(format!("versioning of {}", uri)));
            }
            location.child("fcr:versions").uri()
        } else {
            head.links
                .find(REL_TIMEMAP)
                .map(str::to_string)
                .ok_or_else(|| SyncError::Capability(format!("versioning of {}", uri)))?
        };

        let response = send!(self.http, self.request(Method::Post, &target, auth));
        if let Some(upstream) = classify_read(&response) {
            return Ok(upstream);
        }
        Ok(Upstream::Ok(VersionReceipt {
            status: response.status,
            location: response.header(header::LOCATION).map(str::to_string),
        }))
    }
}

/// Classifies a non-2xx response to a read-style request.
fn classify_read<T>(response: &HttpResponse) -> Option<Upstream<T>> {
    match response.status {
        _ if response.is_success() => None,
        404 | 410 => Some(fault(FaultKind::NotFound, response).into()),
        409 | 412 => Some(fault(FaultKind::Conflict, response).into()),
        _ => Some(fault(FaultKind::Failed, response).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldpsync_graph::MetadataTransformer;
    use ldpsync_protocol::{MockHttpClient, TransportError};

    const BASE: &str = "http://repo.test/rest";

    fn location() -> ResourceLocation {
        ResourceLocation::new(BASE, "ab/cd")
    }

    fn uri() -> String {
        location().uri()
    }

    fn client(http: &MockHttpClient) -> RepositoryClient<&MockHttpClient> {
        RepositoryClient::new(http, &SyncConfig::new(BASE))
    }

    fn payload() -> RepositoryPayload {
        let graph = ldpsync_graph::from_json(&serde_json::json!([
            {"@id": uri(), "http://purl.org/dc/terms/title": [{"@value": "t"}]}
        ]))
        .unwrap();
        MetadataTransformer::default()
            .transform(&graph, &uri(), &uri())
            .unwrap()
    }

    #[test]
    fn head_absent_and_gone() {
        let http = MockHttpClient::new();
        http.respond(Method::Head, &uri(), HttpResponse::new(404));
        let head = client(&http).head(&location(), None).unwrap();
        assert_eq!(head, Upstream::Ok(ResourceHead::default()));

        let http = MockHttpClient::new();
        http.respond(Method::Head, &uri(), HttpResponse::new(410));
        let head = client(&http).head(&location(), None).unwrap();
        assert_eq!(head.status(), Some(410));
        assert!(matches!(head, Upstream::NotFound { .. }));
    }

    #[test]
    fn head_reads_token_links_and_digest() {
        let http = MockHttpClient::new();
        http.respond(
            Method::Head,
            &uri(),
            HttpResponse::new(200)
                .with_header("ETag", "W/\"abc\"")
                .with_header("Link", format!("<{}/fcr:metadata>; rel=\"describedby\"", uri()))
                .with_header("Digest", "sha-256=00ff"),
        );
        let Upstream::Ok(head) = client(&http).head(&location(), None).unwrap() else {
            panic!("expected head")
        };
        assert!(head.exists);
        assert_eq!(head.token, Some(ConcurrencyToken::new("abc")));
        assert_eq!(
            head.described_by().map(str::to_string),
            Some(format!("{}/fcr:metadata", uri()))
        );
        assert_eq!(head.digest, Some(ContentDigest::sha256("00ff")));
    }

    #[test]
    fn head_forbidden_is_preserved() {
        let http = MockHttpClient::new();
        http.respond(Method::Head, &uri(), HttpResponse::new(403));
        let head = client(&http).head(&location(), None).unwrap();
        assert!(matches!(head, Upstream::Failed { status: 403, .. }));
    }

    #[test]
    fn get_without_etag_is_malformed() {
        let http = MockHttpClient::new();
        http.respond(Method::Get, &uri(), HttpResponse::new(200).with_body("[]"));
        let err = client(&http).get(&location(), None).unwrap_err();
        assert!(matches!(err, SyncError::MalformedMetadata(_)));
    }

    #[test]
    fn get_sends_prefer_omit() {
        let http = MockHttpClient::new();
        http.respond(
            Method::Get,
            &uri(),
            HttpResponse::new(200)
                .with_header("ETag", "\"1\"")
                .with_body(format!(
                    r#"[{{"@id": "{}", "http://schema.org/dateModified": [{{"@value": "2024-01-01T00:00:00Z"}}]}}]"#,
                    uri()
                )),
        );
        let Upstream::Ok(resource) = client(&http).get(&location(), None).unwrap() else {
            panic!("expected resource")
        };
        assert_eq!(resource.token.as_str(), "1");
        assert_eq!(resource.modified, Some(ModifiedMarker::parse("2024-01-01T00:00:00Z").unwrap()));

        let sent = &http.requests()[0];
        assert!(sent
            .header_value("Prefer")
            .is_some_and(|p| p.contains("PreferContainment")));
    }

    #[test]
    fn put_creation_and_update_headers() {
        let http = MockHttpClient::new();
        http.respond(
            Method::Put,
            &uri(),
            HttpResponse::new(201).with_header("Location", uri()),
        );
        let Upstream::Ok(receipt) = client(&http)
            .put(&location(), WriteBody::Rdf(payload()), None, None)
            .unwrap()
        else {
            panic!("expected receipt")
        };
        assert!(receipt.created);
        assert_eq!(receipt.location, Some(uri()));

        let sent = &http.requests()[0];
        assert_eq!(sent.header_value("If-None-Match"), Some("*"));
        assert_eq!(sent.header_value("If-Match"), None);
        assert!(sent
            .header_value("Prefer")
            .is_some_and(|p| p.contains("lenient")));

        let http = MockHttpClient::new();
        http.respond(Method::Put, &uri(), HttpResponse::new(204));
        let token = ConcurrencyToken::new("7");
        let Upstream::Ok(receipt) = client(&http)
            .put(&location(), WriteBody::Rdf(payload()), Some(&token), None)
            .unwrap()
        else {
            panic!("expected receipt")
        };
        assert!(!receipt.created);
        assert_eq!(http.requests()[0].header_value("If-Match"), Some("\"7\""));
    }

    #[test]
    fn put_precondition_failed_is_conflict() {
        let http = MockHttpClient::new();
        http.respond(Method::Put, &uri(), HttpResponse::new(412).with_body("etag mismatch"));
        let result = client(&http)
            .put(&location(), WriteBody::Rdf(payload()), Some(&ConcurrencyToken::new("1")), None)
            .unwrap();
        assert_eq!(
            result,
            Upstream::Conflict {
                status: 412,
                message: "etag mismatch".into()
            }
        );
    }

    #[test]
    fn put_binary_forwards_digest() {
        let http = MockHttpClient::new();
        http.respond(Method::Put, &uri(), HttpResponse::new(204));
        let body = WriteBody::Binary {
            bytes: Bytes::from_static(b"abc"),
            content_type: Some("text/plain".into()),
            digest: Some(ContentDigest::sha256("ba7816bf")),
        };
        client(&http)
            .put(&location(), body, Some(&ConcurrencyToken::new("1")), None)
            .unwrap();
        let sent = &http.requests()[0];
        assert_eq!(sent.header_value("Digest"), Some("sha-256=ba7816bf"));
        assert_eq!(sent.header_value("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn put_external_is_bodiless_link() {
        let http = MockHttpClient::new();
        http.respond(Method::Put, &uri(), HttpResponse::new(201));
        let body = WriteBody::External {
            url: "http://cms.test/f.mp4".into(),
            content_type: "video/mp4".into(),
        };
        client(&http).put(&location(), body, None, None).unwrap();
        let sent = &http.requests()[0];
        assert!(sent.body.is_none());
        let link = sent.header_value("Link").unwrap();
        assert!(link.contains(EXTERNAL_CONTENT_REL));
        assert!(link.contains("type=\"video/mp4\""));
    }

    #[test]
    fn delete_statuses() {
        let http = MockHttpClient::new();
        http.respond(Method::Delete, &uri(), HttpResponse::new(204));
        http.respond(Method::Delete, &uri(), HttpResponse::new(410));
        let repo = client(&http);
        assert_eq!(repo.delete(&location(), None).unwrap(), Upstream::Ok(204));
        assert!(matches!(
            repo.delete(&location(), None).unwrap(),
            Upstream::NotFound { status: 410, .. }
        ));
    }

    #[test]
    fn transport_timeout_is_504() {
        let http = MockHttpClient::new();
        http.fail(Method::Delete, &uri(), TransportError::Timeout("slow".into()));
        let result = client(&http).delete(&location(), None).unwrap();
        assert_eq!(result.status(), Some(504));
    }

    #[test]
    fn version_modern_posts_to_timemap() {
        let http = MockHttpClient::new();
        let timemap = format!("{}/fcr:versions", uri());
        http.respond(
            Method::Head,
            &uri(),
            HttpResponse::new(200)
                .with_header("ETag", "\"1\"")
                .with_header("Link", format!("<{}>; rel=\"timemap\"", timemap)),
        );
        http.respond(
            Method::Post,
            &timemap,
            HttpResponse::new(201).with_header("Location", format!("{}/20240101000000", timemap)),
        );
        let Upstream::Ok(receipt) = client(&http).create_version(&location(), false, None).unwrap()
        else {
            panic!("expected receipt")
        };
        assert_eq!(receipt.status, 201);
        assert!(receipt.location.unwrap().ends_with("20240101000000"));
    }

    #[test]
    fn version_without_capability() {
        let http = MockHttpClient::new();
        http.respond(Method::Head, &uri(), HttpResponse::new(200).with_header("ETag", "\"1\""));
        let err = client(&http)
            .create_version(&location(), false, None)
            .unwrap_err();
        assert!(matches!(err, SyncError::Capability(_)));
        assert!(client(&http).create_version(&location(), true, None).is_err());
    }

    #[test]
    fn version_legacy_uses_fcr_versions() {
        let http = MockHttpClient::new();
        http.respond(
            Method::Head,
            &uri(),
            HttpResponse::new(200).with_header(
                "Link",
                format!("<{}>; rel=\"type\"", MEMENTO_ORIGINAL_RESOURCE),
            ),
        );
        http.respond(
            Method::Post,
            &format!("{}/fcr:versions", uri()),
            HttpResponse::new(201),
        );
        let receipt = client(&http).create_version(&location(), true, None).unwrap();
        assert!(receipt.is_ok());
    }

    #[test]
    fn version_absent_is_not_found() {
        let http = MockHttpClient::new();
        http.respond(Method::Head, &uri(), HttpResponse::new(404));
        let result = client(&http).create_version(&location(), false, None).unwrap();
        assert!(matches!(result, Upstream::NotFound { status: 404, .. }));
    }
}
