//! The synchronization engine.

use crate::config::SyncConfig;
use crate::content::{CmsEntity, ContentSourceClient};
use crate::error::{SyncError, SyncResult};
use crate::repository::{RepositoryClient, RepositoryResource, ResourceHead, WriteBody};
use crate::state::SyncPhase;
use ldpsync_graph::MetadataTransformer;
use ldpsync_protocol::{
    AuthToken, ConflictReason, EntityKind, EntityRef, FaultKind, HttpClient, ModifiedMarker,
    ResourceLocation, SyncOutcome, SyncStatus, Upstream, UpstreamFault, UpstreamSource,
};
use ldpsync_resolver::PathResolver;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use ldpsync_protocol::UpstreamSource::{Cms, Repository};

/// Unwraps an upstream call, ending the walk with its fault otherwise.
macro_rules! settle {
    ($walk:expr, $source:expr, $call:expr) => {
        match $call?.into_result() {
            Ok(value) => value,
            Err(fault) => return $walk.fault($source, fault),
        }
    };
}

/// A request to push one entity's CMS state into the repository.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    /// The entity.
    pub entity: EntityRef,
    /// CMS URL of the entity's JSON-LD representation.
    pub locator: String,
    /// Repository root overriding the configured one.
    pub repository_base: Option<String>,
    /// Caller credentials, forwarded to both upstreams.
    pub auth: Option<AuthToken>,
}

impl SaveRequest {
    /// Creates a request.
    pub fn new(entity: EntityRef, locator: impl Into<String>) -> Self {
        Self {
            entity,
            locator: locator.into(),
            repository_base: None,
            auth: None,
        }
    }

    /// Sets the repository root.
    pub fn with_repository_base(mut self, base: impl Into<String>) -> Self {
        self.repository_base = Some(base.into());
        self
    }

    /// Sets the credentials.
    pub fn with_auth(mut self, auth: AuthToken) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// A request to delete an entity's repository resource.
#[derive(Debug, Clone)]
pub struct DeleteRequest {
    /// Entity identifier.
    pub identifier: String,
    /// Repository root overriding the configured one.
    pub repository_base: Option<String>,
    /// Caller credentials.
    pub auth: Option<AuthToken>,
}

impl DeleteRequest {
    /// Creates a request.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            repository_base: None,
            auth: None,
        }
    }

    /// Sets the repository root.
    pub fn with_repository_base(mut self, base: impl Into<String>) -> Self {
        self.repository_base = Some(base.into());
        self
    }

    /// Sets the credentials.
    pub fn with_auth(mut self, auth: AuthToken) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// A request to snapshot an entity's repository resource.
#[derive(Debug, Clone)]
pub struct VersionRequest {
    /// Entity identifier.
    pub identifier: String,
    /// Repository root overriding the configured one.
    pub repository_base: Option<String>,
    /// Caller credentials.
    pub auth: Option<AuthToken>,
}

impl VersionRequest {
    /// Creates a request.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            repository_base: None,
            auth: None,
        }
    }

    /// Sets the repository root.
    pub fn with_repository_base(mut self, base: impl Into<String>) -> Self {
        self.repository_base = Some(base.into());
        self
    }

    /// Sets the credentials.
    pub fn with_auth(mut self, auth: AuthToken) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// Per-request phase tracking.
struct Walk {
    subject: String,
    phase: SyncPhase,
}

impl Walk {
    fn new(subject: impl fmt::Display) -> Self {
        Self {
            subject: subject.to_string(),
            phase: SyncPhase::Resolving,
        }
    }

    fn advance(&mut self, next: SyncPhase) -> SyncResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(SyncError::InvalidStateTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        debug!(subject = %self.subject, from = %self.phase, to = %next, "phase transition");
        self.phase = next;
        Ok(())
    }

    fn finish(&mut self, outcome: SyncOutcome) -> SyncResult<SyncOutcome> {
        let terminal = match outcome.status {
            status if status.is_success() => SyncPhase::Done,
            SyncStatus::Conflict(_) => SyncPhase::Conflict,
            _ => SyncPhase::Failed,
        };
        self.advance(terminal)?;
        info!(
            subject = %self.subject,
            status = %outcome.status,
            upstream_status = ?outcome.upstream_status,
            source = ?outcome.source,
            "request finished"
        );
        Ok(outcome)
    }

    fn fault(&mut self, source: UpstreamSource, fault: UpstreamFault) -> SyncResult<SyncOutcome> {
        self.finish(SyncOutcome::from_fault(source, fault))
    }

    /// Like `fault`, but a conflict on a creation means someone else created
    /// the resource first.
    fn creation_fault(&mut self, fault: UpstreamFault) -> SyncResult<SyncOutcome> {
        if fault.kind == FaultKind::Conflict {
            let outcome = SyncOutcome::new(SyncStatus::Conflict(ConflictReason::AlreadyExists))
                .with_upstream(Repository, fault.status)
                .with_body(fault.message);
            return self.finish(outcome);
        }
        self.fault(Repository, fault)
    }
}

/// A binary's description, located and read.
struct Described {
    location: ResourceLocation,
    resource: RepositoryResource,
}

/// Pushes CMS state into the repository.
///
/// Holds only configuration and collaborators; every call builds its own
/// per-request state, so one engine can serve concurrent requests.
pub struct SyncEngine<R: PathResolver, H: HttpClient> {
    config: SyncConfig,
    resolver: R,
    content: ContentSourceClient<Arc<H>>,
    repository: RepositoryClient<Arc<H>>,
    transformer: MetadataTransformer,
}

impl<R: PathResolver, H: HttpClient> SyncEngine<R, H> {
    /// Creates an engine.
    pub fn new(config: SyncConfig, resolver: R, http: H) -> Self {
        let http = Arc::new(http);
        Self {
            content: ContentSourceClient::new(Arc::clone(&http), &config),
            repository: RepositoryClient::new(http, &config),
            transformer: MetadataTransformer::new(config.transform_options()),
            config,
            resolver,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The path resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    fn base<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.config.repository_base)
    }

    /// Pushes one entity's CMS state into the repository.
    ///
    /// # Errors
    ///
    /// Returns `ClientInput` for an empty locator or malformed identifier and
    /// `MalformedMetadata` when either side's metadata has an unexpected
    /// shape. Upstream failures are reported in the returned outcome.
    #[instrument(skip_all, fields(entity = %request.entity))]
    pub fn save(&self, request: &SaveRequest) -> SyncResult<SyncOutcome> {
        if request.locator.trim().is_empty() {
            return Err(SyncError::ClientInput("missing content locator".into()));
        }

        let mut walk = Walk::new(&request.entity);
        let identifier = &request.entity.identifier;
        let base = self.base(request.repository_base.as_deref());

        let location = match self.resolver.resolve(identifier, base)? {
            Some(location) => location,
            None if self.resolver.supports_minting() => {
                let location = self.resolver.mint(identifier, base)?;
                walk.advance(SyncPhase::Creating)?;
                return self.create(&mut walk, request, &location);
            }
            None => {
                return walk.finish(
                    SyncOutcome::new(SyncStatus::NotFound)
                        .with_body(format!("no repository mapping for {}", identifier)),
                )
            }
        };

        walk.advance(SyncPhase::Comparing)?;
        match request.entity.kind {
            EntityKind::Node => self.update_node(&mut walk, request, &location),
            EntityKind::Media => self.update_media(&mut walk, request, &location),
            EntityKind::ExternalFile => self.update_external(&mut walk, request, &location),
        }
    }

    /// Deletes an entity's repository resource.
    ///
    /// # Errors
    ///
    /// Returns `ClientInput` for a malformed identifier.
    #[instrument(skip_all, fields(identifier = %request.identifier))]
    pub fn delete(&self, request: &DeleteRequest) -> SyncResult<SyncOutcome> {
        let mut walk = Walk::new(&request.identifier);
        let base = self.base(request.repository_base.as_deref());

        let Some(location) = self.resolver.resolve(&request.identifier, base)? else {
            return walk.finish(
                SyncOutcome::new(SyncStatus::NotFound)
                    .with_body(format!("no repository mapping for {}", request.identifier)),
            );
        };

        walk.advance(SyncPhase::Writing)?;
        let status = settle!(
            walk,
            Repository,
            self.repository.delete(&location, request.auth.as_ref())
        );
        walk.finish(SyncOutcome::new(SyncStatus::Deleted).with_upstream(Repository, status))
    }

    /// Snapshots an entity's repository resource.
    ///
    /// # Errors
    ///
    /// Returns `Capability` when the resource does not advertise versioning
    /// and `ClientInput` for a malformed identifier.
    #[instrument(skip_all, fields(identifier = %request.identifier))]
    pub fn create_version(&self, request: &VersionRequest) -> SyncResult<SyncOutcome> {
        let mut walk = Walk::new(&request.identifier);
        let base = self.base(request.repository_base.as_deref());

        let Some(location) = self.resolver.resolve(&request.identifier, base)? else {
            return walk.finish(
                SyncOutcome::new(SyncStatus::NotFound)
                    .with_body(format!("no repository mapping for {}", request.identifier)),
            );
        };

        walk.advance(SyncPhase::Writing)?;
        let receipt = settle!(
            walk,
            Repository,
            self.repository.create_version(
                &location,
                self.config.is_legacy_repository,
                request.auth.as_ref()
            )
        );
        let mut outcome =
            SyncOutcome::new(SyncStatus::Versioned).with_upstream(Repository, receipt.status);
        if let Some(memento) = receipt.location {
            outcome = outcome.with_location(memento);
        }
        walk.finish(outcome)
    }

    fn create(
        &self,
        walk: &mut Walk,
        request: &SaveRequest,
        location: &ResourceLocation,
    ) -> SyncResult<SyncOutcome> {
        let auth = request.auth.as_ref();
        let entity = settle!(walk, Cms, self.content.fetch_entity(&request.locator, auth));

        let body = match request.entity.kind {
            EntityKind::Node => {
                walk.advance(SyncPhase::Writing)?;
                let payload =
                    self.transformer
                        .transform(&entity.graph, &entity.subject, &location.uri())?;
                let receipt = match self
                    .repository
                    .put(location, WriteBody::Rdf(payload), None, auth)?
                    .into_result()
                {
                    Ok(receipt) => receipt,
                    Err(fault) => return walk.creation_fault(fault),
                };
                let created_at = receipt.location.unwrap_or_else(|| location.uri());
                return walk.finish(
                    SyncOutcome::new(SyncStatus::Created)
                        .with_location(created_at)
                        .with_upstream(Repository, receipt.status),
                );
            }
            EntityKind::Media => {
                let file = describes(&entity)?;
                let digest = settle!(walk, Cms, self.content.fetch_digest(file, auth));
                let binary = settle!(walk, Cms, self.content.fetch_binary(file, auth));
                WriteBody::Binary {
                    bytes: binary.bytes,
                    content_type: binary.content_type,
                    digest,
                }
            }
            EntityKind::ExternalFile => {
                let file = describes(&entity)?;
                let probe = settle!(walk, Cms, self.content.probe(file, auth));
                WriteBody::External {
                    url: file.to_string(),
                    content_type: probe
                        .content_type
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                }
            }
        };

        walk.advance(SyncPhase::Writing)?;
        if let Err(fault) = self.repository.put(location, body, None, auth)?.into_result() {
            return walk.creation_fault(fault);
        }

        let head = settle!(walk, Repository, self.repository.head(location, auth));
        let described = settle!(walk, Repository, self.describe(location, &head, auth));
        self.write_description(walk, location, &described, &entity, SyncStatus::Created, auth)
    }

    fn update_node(
        &self,
        walk: &mut Walk,
        request: &SaveRequest,
        location: &ResourceLocation,
    ) -> SyncResult<SyncOutcome> {
        let auth = request.auth.as_ref();
        let head = settle!(walk, Repository, self.repository.head(location, auth));
        if !head.exists {
            walk.advance(SyncPhase::Creating)?;
            return self.create(walk, request, location);
        }

        let current = settle!(walk, Repository, self.repository.get(location, auth));
        let entity = settle!(walk, Cms, self.content.fetch_entity(&request.locator, auth));
        if let Some(stale) = stale_outcome(&walk.subject, current.modified, entity.modified) {
            return walk.finish(stale);
        }

        walk.advance(SyncPhase::Writing)?;
        let payload = self
            .transformer
            .transform(&entity.graph, &entity.subject, &location.uri())?;
        let receipt = settle!(
            walk,
            Repository,
            self.repository
                .put(location, WriteBody::Rdf(payload), Some(&current.token), auth)
        );
        let status = if receipt.created {
            SyncStatus::Created
        } else {
            SyncStatus::Updated
        };
        walk.finish(SyncOutcome::new(status).with_upstream(Repository, receipt.status))
    }

    fn update_media(
        &self,
        walk: &mut Walk,
        request: &SaveRequest,
        location: &ResourceLocation,
    ) -> SyncResult<SyncOutcome> {
        let auth = request.auth.as_ref();
        let head = settle!(walk, Repository, self.repository.head(location, auth));
        if !head.exists {
            walk.advance(SyncPhase::Creating)?;
            return self.create(walk, request, location);
        }

        let described = settle!(walk, Repository, self.describe(location, &head, auth));
        let entity = settle!(walk, Cms, self.content.fetch_entity(&request.locator, auth));
        let file = describes(&entity)?;
        let cms_digest = settle!(walk, Cms, self.content.fetch_digest(file, auth));

        let binary_changed = match (&cms_digest, &head.digest) {
            (Some(cms), Some(repository)) => cms != repository,
            _ => true,
        };
        debug!(binary_changed, "compared digests");

        if let (Some(repository), Some(cms)) = (described.resource.modified, entity.modified) {
            if repository == cms && !binary_changed {
                return walk.finish(
                    SyncOutcome::new(SyncStatus::Unchanged).with_location(location.uri()),
                );
            }
        }
        if let Some(stale) =
            stale_outcome(&walk.subject, described.resource.modified, entity.modified)
        {
            return walk.finish(stale);
        }

        walk.advance(SyncPhase::Writing)?;
        let described = if binary_changed {
            let binary_token = head.token.clone().ok_or_else(|| {
                SyncError::MalformedMetadata(format!("{} has no ETag", location.uri()))
            })?;
            let binary = settle!(walk, Cms, self.content.fetch_binary(file, auth));
            let body = WriteBody::Binary {
                bytes: binary.bytes,
                content_type: binary.content_type,
                digest: cms_digest,
            };
            settle!(
                walk,
                Repository,
                self.repository.put(location, body, Some(&binary_token), auth)
            );
            settle!(walk, Repository, self.reread(location, described, auth))
        } else {
            described
        };

        self.write_description(walk, location, &described, &entity, SyncStatus::Updated, auth)
    }

    fn update_external(
        &self,
        walk: &mut Walk,
        request: &SaveRequest,
        location: &ResourceLocation,
    ) -> SyncResult<SyncOutcome> {
        let auth = request.auth.as_ref();
        let head = settle!(walk, Repository, self.repository.head(location, auth));
        if !head.exists {
            walk.advance(SyncPhase::Creating)?;
            return self.create(walk, request, location);
        }

        let binary_token = head.token.clone().ok_or_else(|| {
            SyncError::MalformedMetadata(format!("{} has no ETag", location.uri()))
        })?;
        let described = settle!(walk, Repository, self.describe(location, &head, auth));
        let entity = settle!(walk, Cms, self.content.fetch_entity(&request.locator, auth));
        let file = describes(&entity)?;
        if let Some(stale) =
            stale_outcome(&walk.subject, described.resource.modified, entity.modified)
        {
            return walk.finish(stale);
        }

        walk.advance(SyncPhase::Writing)?;
        let probe = settle!(walk, Cms, self.content.probe(file, auth));
        let body = WriteBody::External {
            url: file.to_string(),
            content_type: probe
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        };
        settle!(
            walk,
            Repository,
            self.repository.put(location, body, Some(&binary_token), auth)
        );
        let described = settle!(walk, Repository, self.reread(location, described, auth));

        self.write_description(walk, location, &described, &entity, SyncStatus::Updated, auth)
    }

    /// Locates and reads the description of the binary at `location`.
    fn describe(
        &self,
        location: &ResourceLocation,
        head: &ResourceHead,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<Described>> {
        let target = head.described_by().ok_or_else(|| {
            SyncError::MalformedMetadata(format!(
                "{} has no describedby link",
                location.uri()
            ))
        })?;
        let description = ResourceLocation::from_uri(&location.base, target)?;
        Ok(self
            .repository
            .get_description(&description, &location.uri(), auth)?
            .map(|resource| Described {
                location: description,
                resource,
            }))
    }

    /// Reads a description again after its binary changed.
    fn reread(
        &self,
        location: &ResourceLocation,
        described: Described,
        auth: Option<&AuthToken>,
    ) -> SyncResult<Upstream<Described>> {
        Ok(self
            .repository
            .get_description(&described.location, &location.uri(), auth)?
            .map(|resource| Described {
                location: described.location,
                resource,
            }))
    }

    fn write_description(
        &self,
        walk: &mut Walk,
        location: &ResourceLocation,
        described: &Described,
        entity: &CmsEntity,
        status: SyncStatus,
        auth: Option<&AuthToken>,
    ) -> SyncResult<SyncOutcome> {
        let payload = self
            .transformer
            .transform(&entity.graph, &entity.subject, &location.uri())?;
        let receipt = settle!(
            walk,
            Repository,
            self.repository.put(
                &described.location,
                WriteBody::Rdf(payload),
                Some(&described.resource.token),
                auth
            )
        );

        let outcome = SyncOutcome::new(status).with_upstream(Repository, receipt.status);
        walk.finish(if status == SyncStatus::Created {
            outcome.with_location(location.uri())
        } else {
            outcome
        })
    }
}

/// The file a CMS media entity points at.
fn describes(entity: &CmsEntity) -> SyncResult<&str> {
    entity.describes().ok_or_else(|| {
        SyncError::MalformedMetadata(format!("{} has no describes link", entity.subject))
    })
}

/// Refuses a write when the repository copy is not older than the CMS state.
///
/// Unknown markers on either side mean "proceed".
fn stale_outcome(
    subject: &str,
    repository: Option<ModifiedMarker>,
    cms: Option<ModifiedMarker>,
) -> Option<SyncOutcome> {
    let (repository, cms) = (repository?, cms?);
    if repository < cms {
        return None;
    }
    if repository > cms {
        warn!(
            %subject,
            repository = %repository.to_literal(),
            cms = %cms.to_literal(),
            "repository copy is newer than the CMS"
        );
    }
    Some(
        SyncOutcome::new(SyncStatus::Conflict(ConflictReason::Stale))
            .with_upstream(Repository, 412)
            .with_body(format!(
                "repository copy modified {} is not older than CMS state modified {}",
                repository.to_literal(),
                cms.to_literal()
            )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldpsync_protocol::{HttpResponse, Method, MockHttpClient, TransportError};
    use ldpsync_resolver::{MappingResolver, MemoryMappingStore, PairtreeResolver};

    const ID: &str = "0a1b2c3d-0000-4000-8000-000000000001";
    const BASE: &str = "http://repo.test/rest";
    const LOCATOR: &str = "http://cms.test/node/1?_format=jsonld";

    fn target() -> String {
        format!("{}/0a/1b/2c/3d/{}", BASE, ID)
    }

    fn cms_body(modified: &str) -> String {
        format!(
            r#"[{{"@id": "http://cms.test/node/1",
                 "http://purl.org/dc/terms/title": [{{"@value": "A node"}}],
                 "http://schema.org/dateModified": [{{"@value": "{}"}}]}}]"#,
            modified
        )
    }

    fn repo_body(modified: &str) -> String {
        format!(
            r#"[{{"@id": "{}", "http://schema.org/dateModified": [{{"@value": "{}"}}]}}]"#,
            target(),
            modified
        )
    }

    fn engine(http: MockHttpClient) -> SyncEngine<PairtreeResolver, MockHttpClient> {
        SyncEngine::new(SyncConfig::new(BASE), PairtreeResolver::new(), http)
    }

    fn existing_node(http: &MockHttpClient, repo_modified: &str, cms_modified: &str) {
        http.respond(Method::Head, &target(), HttpResponse::new(200).with_header("ETag", "\"5\""));
        http.respond(
            Method::Get,
            &target(),
            HttpResponse::new(200)
                .with_header("ETag", "\"5\"")
                .with_body(repo_body(repo_modified)),
        );
        http.respond(
            Method::Get,
            LOCATOR,
            HttpResponse::new(200).with_body(cms_body(cms_modified)),
        );
    }

    #[test]
    fn creates_absent_node() {
        let http = MockHttpClient::new();
        http.respond(Method::Head, &target(), HttpResponse::new(404));
        http.respond(
            Method::Get,
            LOCATOR,
            HttpResponse::new(200).with_body(cms_body("2024-05-01T10:00:00Z")),
        );
        http.respond(
            Method::Put,
            &target(),
            HttpResponse::new(201).with_header("Location", target()),
        );

        let engine = engine(http);
        let outcome = engine
            .save(&SaveRequest::new(EntityRef::node(ID), LOCATOR))
            .unwrap();
        assert_eq!(outcome.status, SyncStatus::Created);
        assert_eq!(outcome.location, Some(target()));
        assert_eq!(outcome.http_status(), 201);
    }

    #[test]
    fn updates_when_cms_is_newer() {
        let http = MockHttpClient::new();
        existing_node(&http, "2024-05-01T10:00:00Z", "2024-05-02T10:00:00Z");
        http.respond(Method::Put, &target(), HttpResponse::new(204));

        let engine = engine(http);
        let outcome = engine
            .save(&SaveRequest::new(EntityRef::node(ID), LOCATOR))
            .unwrap();
        assert_eq!(outcome.status, SyncStatus::Updated);
    }

    #[test]
    fn refuses_stale_write() {
        let http = Arc::new(MockHttpClient::new());
        existing_node(&http, "2024-05-02T10:00:00Z", "2024-05-01T10:00:00Z");

        let engine = SyncEngine::new(
            SyncConfig::new(BASE),
            PairtreeResolver::new(),
            Arc::clone(&http),
        );
        let outcome = engine
            .save(&SaveRequest::new(EntityRef::node(ID), LOCATOR))
            .unwrap();
        assert_eq!(outcome.status, SyncStatus::Conflict(ConflictReason::Stale));
        assert_eq!(outcome.http_status(), 412);
        assert!(http.requests_with(Method::Put).is_empty());
    }

    #[test]
    fn token_rejected_is_token_mismatch() {
        let http = MockHttpClient::new();
        existing_node(&http, "2024-05-01T10:00:00Z", "2024-05-02T10:00:00Z");
        http.respond(Method::Put, &target(), HttpResponse::new(412).with_body("etag"));

        let outcome = engine(http)
            .save(&SaveRequest::new(EntityRef::node(ID), LOCATOR))
            .unwrap();
        assert_eq!(
            outcome.status,
            SyncStatus::Conflict(ConflictReason::TokenMismatch)
        );
        assert_eq!(outcome.body, "etag");
    }

    #[test]
    fn concurrent_creation_is_already_exists() {
        let http = MockHttpClient::new();
        http.respond(Method::Head, &target(), HttpResponse::new(404));
        http.respond(
            Method::Get,
            LOCATOR,
            HttpResponse::new(200).with_body(cms_body("2024-05-01T10:00:00Z")),
        );
        http.respond(Method::Put, &target(), HttpResponse::new(412));

        let outcome = engine(http)
            .save(&SaveRequest::new(EntityRef::node(ID), LOCATOR))
            .unwrap();
        assert_eq!(
            outcome.status,
            SyncStatus::Conflict(ConflictReason::AlreadyExists)
        );
    }

    #[test]
    fn cms_failure_is_forwarded() {
        let http = MockHttpClient::new();
        http.respond(Method::Head, &target(), HttpResponse::new(404));
        http.respond(Method::Get, LOCATOR, HttpResponse::new(403).with_body("denied"));

        let outcome = engine(http)
            .save(&SaveRequest::new(EntityRef::node(ID), LOCATOR))
            .unwrap();
        assert_eq!(outcome.status, SyncStatus::UpstreamError);
        assert_eq!(outcome.source, Some(UpstreamSource::Cms));
        assert_eq!(outcome.http_status(), 403);
        assert_eq!(outcome.body, "denied");
    }

    #[test]
    fn repository_timeout_is_gateway_timeout() {
        let http = MockHttpClient::new();
        http.fail(Method::Head, &target(), TransportError::Timeout("30s".into()));

        let outcome = engine(http)
            .save(&SaveRequest::new(EntityRef::node(ID), LOCATOR))
            .unwrap();
        assert_eq!(outcome.status, SyncStatus::UpstreamError);
        assert_eq!(outcome.source, Some(UpstreamSource::Repository));
        assert_eq!(outcome.http_status(), 504);
    }

    #[test]
    fn empty_locator_is_client_input() {
        let http = Arc::new(MockHttpClient::new());
        let engine = SyncEngine::new(
            SyncConfig::new(BASE),
            PairtreeResolver::new(),
            Arc::clone(&http),
        );
        let err = engine
            .save(&SaveRequest::new(EntityRef::node(ID), " "))
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(http.requests().is_empty());
    }

    #[test]
    fn malformed_identifier_is_client_input() {
        let err = engine(MockHttpClient::new())
            .save(&SaveRequest::new(EntityRef::node("not-a-uuid"), LOCATOR))
            .unwrap_err();
        assert!(matches!(err, SyncError::ClientInput(_)));
    }

    #[test]
    fn delete_without_mapping_makes_no_call() {
        let http = Arc::new(MockHttpClient::new());
        let engine = SyncEngine::new(
            SyncConfig::new(BASE),
            MappingResolver::new(MemoryMappingStore::new()),
            Arc::clone(&http),
        );
        let outcome = engine.delete(&DeleteRequest::new(ID)).unwrap();
        assert_eq!(outcome.status, SyncStatus::NotFound);
        assert_eq!(outcome.http_status(), 404);
        assert!(http.requests().is_empty());
    }

    #[test]
    fn version_reports_memento_location() {
        let http = MockHttpClient::new();
        let timemap = format!("{}/fcr:versions", target());
        http.respond(
            Method::Head,
            &target(),
            HttpResponse::new(200).with_header("Link", format!("<{}>; rel=\"timemap\"", timemap)),
        );
        http.respond(
            Method::Post,
            &timemap,
            HttpResponse::new(201).with_header("Location", format!("{}/1", timemap)),
        );

        let outcome = engine(http).create_version(&VersionRequest::new(ID)).unwrap();
        assert_eq!(outcome.status, SyncStatus::Versioned);
        assert_eq!(outcome.location, Some(format!("{}/1", timemap)));
    }

    #[test]
    fn metadata_update_needs_no_binary_etag() {
        const MEDIA: &str = "http://cms.test/media/1?_format=jsonld";
        const FILE: &str = "http://cms.test/file/1.tiff";
        let description = format!("{}/fcr:metadata", target());

        let http = Arc::new(MockHttpClient::new());
        http.respond(
            Method::Head,
            &target(),
            HttpResponse::new(200)
                .with_header("Link", format!("<{}>; rel=\"describedby\"", description))
                .with_header("Digest", "sha-256=aa"),
        );
        http.respond(
            Method::Get,
            &description,
            HttpResponse::new(200)
                .with_header("ETag", "\"d1\"")
                .with_body(repo_body("2024-05-01T10:00:00Z")),
        );
        http.respond(
            Method::Get,
            MEDIA,
            HttpResponse::new(200)
                .with_header("Link", format!("<{}>; rel=\"describes\"", FILE))
                .with_body(
                    r#"[{"@id": "http://cms.test/media/1",
                        "http://schema.org/dateModified": [{"@value": "2024-05-02T10:00:00Z"}]}]"#,
                ),
        );
        http.respond(Method::Head, FILE, HttpResponse::new(200).with_header("Digest", "sha-256=aa"));
        http.respond(Method::Put, &description, HttpResponse::new(204));

        let engine = SyncEngine::new(
            SyncConfig::new(BASE),
            PairtreeResolver::new(),
            Arc::clone(&http),
        );
        let outcome = engine
            .save(&SaveRequest::new(EntityRef::media(ID), MEDIA))
            .unwrap();
        assert_eq!(outcome.status, SyncStatus::Updated);
        let puts = http.requests_with(Method::Put);
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].url, description);
    }

    #[test]
    fn stale_rule() {
        let old = ModifiedMarker::from_unix(100);
        let new = ModifiedMarker::from_unix(200);
        assert!(stale_outcome("s", Some(old), Some(new)).is_none());
        assert!(stale_outcome("s", Some(new), Some(new)).is_some());
        assert!(stale_outcome("s", Some(new), Some(old)).is_some());
        assert!(stale_outcome("s", None, Some(new)).is_none());
        assert!(stale_outcome("s", Some(new), None).is_none());
    }
}
