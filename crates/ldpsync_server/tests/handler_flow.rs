//! Caller-facing requests against the in-memory CMS and repository.

use ldpsync_engine::{SyncConfig, SyncEngine};
use ldpsync_resolver::PairtreeResolver;
use ldpsync_server::{InboundRequest, Operation, RequestHandler, ServerConfig};
use ldpsync_testkit::prelude::*;

fn handler(network: &FakeNetwork) -> RequestHandler<PairtreeResolver, FakeNetwork> {
    let engine = SyncEngine::new(
        SyncConfig::new(REPOSITORY_BASE),
        PairtreeResolver::new(),
        network.clone(),
    );
    RequestHandler::new(engine, ServerConfig::new())
}

fn save(id: &str, n: u32) -> InboundRequest {
    InboundRequest::new(Operation::Save, id)
        .with_kind("node")
        .with_header("Content-Location", jsonld_locator(&node_url(n)))
}

#[test]
fn save_answers_created_with_location() {
    let network = FakeNetwork::new();
    let id = fixed_identifier(1);
    network
        .cms()
        .put_entity(&node_url(1), node_jsonld(&node_url(1), "Hello", T1));

    let response = handler(&network).handle(&save(&id, 1));
    assert_eq!(response.status, 201);
    assert_eq!(response.header("Location"), Some(pairtree_uri(&id).as_str()));
    assert!(network.repository().contains(&pairtree_uri(&id)));
}

#[test]
fn newer_cms_state_answers_no_content() {
    let network = FakeNetwork::new();
    let id = fixed_identifier(2);
    let handler = handler(&network);
    network
        .cms()
        .put_entity(&node_url(2), node_jsonld(&node_url(2), "First", T1));
    assert_eq!(handler.handle(&save(&id, 2)).status, 201);

    network
        .cms()
        .put_entity(&node_url(2), node_jsonld(&node_url(2), "Second", T2));
    let response = handler.handle(&save(&id, 2));
    assert_eq!(response.status, 204);
    assert_eq!(response.header("Location"), None);
}

#[test]
fn stale_save_is_a_precondition_failure() {
    let network = FakeNetwork::new();
    let id = fixed_identifier(3);
    let handler = handler(&network);
    network
        .cms()
        .put_entity(&node_url(3), node_jsonld(&node_url(3), "First", T2));
    handler.handle(&save(&id, 3));

    let writes = network.repository().writes();
    let response = handler.handle(&save(&id, 3));
    assert_eq!(response.status, 412);
    assert_eq!(network.repository().writes(), writes);
}

#[test]
fn cms_status_is_forwarded() {
    let network = FakeNetwork::new();
    network.cms().fail(&node_url(4), 403);
    let response = handler(&network).handle(&save(&fixed_identifier(4), 4));
    assert_eq!(response.status, 403);
    assert_eq!(network.repository().writes(), 0);
}

#[test]
fn authorization_reaches_both_upstreams() {
    let network = FakeNetwork::new();
    network
        .cms()
        .put_entity(&node_url(5), node_jsonld(&node_url(5), "Hello", T1));
    let request = save(&fixed_identifier(5), 5).with_header("Authorization", "Bearer abc");
    assert_eq!(handler(&network).handle(&request).status, 201);

    assert!(network
        .cms()
        .authorizations()
        .iter()
        .all(|a| a.as_deref() == Some("Bearer abc")));
    assert!(network
        .requests()
        .iter()
        .all(|r| r.header_value("Authorization") == Some("Bearer abc")));
}

#[test]
fn delete_then_delete_again() {
    let network = FakeNetwork::new();
    let id = fixed_identifier(6);
    let handler = handler(&network);
    network
        .cms()
        .put_entity(&node_url(6), node_jsonld(&node_url(6), "Hello", T1));
    handler.handle(&save(&id, 6));

    let delete = InboundRequest::new(Operation::Delete, &id);
    assert_eq!(handler.handle(&delete).status, 204);
    assert_eq!(handler.handle(&delete).status, 410);
}

#[test]
fn version_answers_created_with_memento_location() {
    let network = FakeNetwork::new();
    let id = fixed_identifier(7);
    let handler = handler(&network);
    network
        .cms()
        .put_entity(&node_url(7), node_jsonld(&node_url(7), "Hello", T1));
    handler.handle(&save(&id, 7));

    let response = handler.handle(&InboundRequest::new(Operation::Version, &id));
    assert_eq!(response.status, 201);
    assert!(response
        .header("Location")
        .is_some_and(|l| l.starts_with(&pairtree_uri(&id))));
}

#[test]
fn version_without_capability_is_method_not_allowed() {
    let network = FakeNetwork::new();
    let id = fixed_identifier(8);
    let handler = handler(&network);
    network
        .cms()
        .put_entity(&node_url(8), node_jsonld(&node_url(8), "Hello", T1));
    handler.handle(&save(&id, 8));
    network.repository().disable_versioning();

    let response = handler.handle(&InboundRequest::new(Operation::Version, &id));
    assert_eq!(response.status, 405);
}
