//! One `HttpClient` in front of both fakes.

use crate::cms::FakeCms;
use crate::repository::FakeRepository;
use ldpsync_protocol::{HttpClient, HttpRequest, HttpResponse, TransportError};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Routes requests to a [`FakeCms`] or [`FakeRepository`] by URL prefix.
///
/// Cloning shares the underlying fakes, so a test can keep a handle for
/// assertions while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeNetwork {
    cms: Arc<FakeCms>,
    repository: Arc<FakeRepository>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    timeouts: Arc<Mutex<BTreeSet<String>>>,
}

impl FakeNetwork {
    /// Creates a network with an empty CMS and repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// The CMS.
    pub fn cms(&self) -> &FakeCms {
        &self.cms
    }

    /// The repository.
    pub fn repository(&self) -> &FakeRepository {
        &self.repository
    }

    /// Every request routed so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Makes every request under `prefix` time out.
    pub fn time_out(&self, prefix: &str) {
        self.timeouts.lock().insert(prefix.to_string());
    }
}

impl HttpClient for FakeNetwork {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());

        if self
            .timeouts
            .lock()
            .iter()
            .any(|prefix| request.url.starts_with(prefix.as_str()))
        {
            return Err(TransportError::Timeout(request.url));
        }
        if request.url.starts_with(self.repository.base()) {
            Ok(self.repository.handle(&request))
        } else if request.url.starts_with(self.cms.base()) {
            Ok(self.cms.handle(&request))
        } else {
            Err(TransportError::Connect(format!("no route to {}", request.url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{file_url, REPOSITORY_BASE};
    use ldpsync_protocol::Method;

    #[test]
    fn routes_by_prefix() {
        let network = FakeNetwork::new();
        network.cms().put_file(&file_url("a"), "x", "text/plain");

        let cms = network
            .execute(HttpRequest::new(Method::Get, file_url("a")))
            .unwrap();
        assert_eq!(cms.status, 200);

        let repo = network
            .execute(HttpRequest::new(Method::Head, format!("{}/x", REPOSITORY_BASE)))
            .unwrap();
        assert_eq!(repo.status, 404);

        let nowhere = network.execute(HttpRequest::new(Method::Get, "http://nowhere.test/"));
        assert!(matches!(nowhere, Err(TransportError::Connect(_))));
        assert_eq!(network.requests().len(), 3);
    }

    #[test]
    fn timeouts() {
        let network = FakeNetwork::new();
        network.time_out(REPOSITORY_BASE);
        let result = network.execute(HttpRequest::new(Method::Head, format!("{}/x", REPOSITORY_BASE)));
        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }
}
