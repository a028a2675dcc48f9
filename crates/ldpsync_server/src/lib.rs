//! # ldpsync Server
//!
//! Caller-facing request handling for the synchronizer.
//!
//! This crate provides:
//! - `InboundRequest`, a transport-neutral view of one caller request
//! - `RequestHandler`, which validates input, runs the engine and turns the
//!   outcome into a status, headers and body
//!
//! Any HTTP framework can sit in front: map its request into an
//! `InboundRequest` and write the `HandlerResponse` back.
//!
//! # Headers
//!
//! - `Content-Location`: CMS URL of the entity (required for saves)
//! - `X-Repository-Base`: repository root overriding the configured one
//! - `Authorization`: forwarded verbatim to both upstreams
//!
//! Missing input is rejected with 400 before any upstream call. Upstream
//! statuses and bodies are forwarded unchanged.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;

pub use config::ServerConfig;
pub use error::{HandlerError, HandlerResult};
pub use handler::{HandlerResponse, InboundRequest, Operation, RequestHandler, REPOSITORY_BASE_HEADER};
