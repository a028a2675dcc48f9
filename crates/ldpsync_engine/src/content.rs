//! Content Source Client: reads entity state from the CMS.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::exchange::fault;
use bytes::Bytes;
use ldpsync_graph::{modified_marker, parse_jsonld, strip_format_suffix, Graph, JSONLD_CONTENT_TYPE};
use ldpsync_protocol::{
    header, AuthToken, ContentDigest, FaultKind, HttpClient, HttpRequest, LinkRelations, Method,
    ModifiedMarker, Upstream,
};
use tracing::debug;

/// Relation a CMS media entity uses to point at its file.
pub const REL_DESCRIBES: &str = "describes";

/// A CMS entity as JSON-LD.
#[derive(Debug, Clone, PartialEq)]
pub struct CmsEntity {
    /// Entity graph, with `_format` stripped from IRIs when configured.
    pub graph: Graph,
    /// Subject IRI of the entity inside `graph`.
    pub subject: String,
    /// Modified marker, if the entity carries one.
    pub modified: Option<ModifiedMarker>,
    /// `Link` relations advertised with the entity.
    pub links: LinkRelations,
}

impl CmsEntity {
    /// The file a media entity describes.
    pub fn describes(&self) -> Option<&str> {
        self.links.find(REL_DESCRIBES)
    }
}

/// A downloaded CMS file.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryContent {
    /// File bytes.
    pub bytes: Bytes,
    /// Declared media type.
    pub content_type: Option<String>,
}

/// What a `HEAD` of a CMS file reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinaryProbe {
    /// Digest from the `Digest` header.
    pub digest: Option<ContentDigest>,
    /// Declared media type.
    pub content_type: Option<String>,
    /// Declared length.
    pub content_length: Option<u64>,
}

/// Reads entities, files and digests from the CMS.
///
/// Any non-2xx response becomes `Upstream::Failed` with the status kept.
#[derive(Debug)]
pub struct ContentSourceClient<H: HttpClient> {
    http: H,
    modified_predicate: String,
    strip_jsonld_suffix: bool,
}

impl<H: HttpClient> ContentSourceClient<H> {
    /// Creates a client.
    pub fn new(http: H, config: &SyncConfig) -> Self {
        Self {
            http,
            modified_predicate: config.modified_predicate.clone(),
            strip_jsonld_suffix: config.strip_jsonld_suffix,
        }
    }

    fn request(&self, method: Method, url: &str, auth: Option<&AuthToken>) -> HttpRequest {
        HttpRequest::new(method, url)
            .header_opt(header::AUTHORIZATION, auth.map(AuthToken::header_value))
    }

    /// Fetches the JSON-LD representation of an entity.
    ///
    /// # Errors
    ///
    /// Returns `MalformedMetadata` if the body is not JSON-LD or the modified
    /// marker cannot be parsed.
    pub fn fetch_entity(
        &self,
        locator: &str,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<CmsEntity>> {
        let request = self
            .request(Method::Get, locator, auth)
            .header(header::ACCEPT, JSONLD_CONTENT_TYPE);
        let response = send!(self.http, request);
        if !response.is_success() {
            return Ok(fault(FaultKind::Failed, &response).into());
        }

        let mut graph = parse_jsonld(&response.body)?;
        let subject = if self.strip_jsonld_suffix {
            graph.map_iris(strip_format_suffix);
            strip_format_suffix(locator)
        } else {
            locator.to_string()
        };
        let modified = modified_marker(&graph, &subject, &self.modified_predicate)?;
        let links = LinkRelations::parse(response.header_values(header::LINK));

        debug!(%subject, modified = ?modified, links = links.len(), "fetched CMS entity");
        Ok(Upstream::Ok(CmsEntity {
            graph,
            subject,
            modified,
            links,
        }))
    }

    /// Downloads a file.
    pub fn fetch_binary(
        &self,
        locator: &str,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<BinaryContent>> {
        let response = send!(self.http, self.request(Method::Get, locator, auth));
        if !response.is_success() {
            return Ok(fault(FaultKind::Failed, &response).into());
        }
        Ok(Upstream::Ok(BinaryContent {
            content_type: response.header(header::CONTENT_TYPE).map(str::to_string),
            bytes: response.body,
        }))
    }

    /// Asks for a file's headers, including its SHA-256 digest.
    ///
    /// # Errors
    ///
    /// Returns `MalformedMetadata` if the `Digest` header cannot be parsed.
    pub fn probe(
        &self,
        locator: &str,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<BinaryProbe>> {
        let request = self
            .request(Method::Head, locator, auth)
            .header(header::WANT_DIGEST, "sha-256");
        let response = send!(self.http, request);
        if !response.is_success() {
            return Ok(fault(FaultKind::Failed, &response).into());
        }

        let digest = response
            .header(header::DIGEST)
            .map(ContentDigest::parse_header)
            .transpose()?;
        Ok(Upstream::Ok(BinaryProbe {
            digest,
            content_type: response.header(header::CONTENT_TYPE).map(str::to_string),
            content_length: response
                .header(header::CONTENT_LENGTH)
                .and_then(|v| v.trim().parse().ok()),
        }))
    }

    /// The file's digest, if the CMS reports one.
    pub fn fetch_digest(
        &self,
        locator: &str,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<Option<ContentDigest>>> {
        Ok(self.probe(locator, auth)?.map(|probe| probe.digest))
    }
}
