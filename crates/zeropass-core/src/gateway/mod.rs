//! Backend access
//!
//! [`ApiGateway`] is the only component that talks to the firewall simulator
//! backend. Every request carries the `X-User-ID` header, every response is
//! passed through [`crate::ownership::filter`] before it is returned or
//! cached, and every write invalidates the cache slice it affects.

mod api;
mod client;
mod poller;

pub use api::ApiGateway;
pub use client::{ProbeReport, RestClient, USER_ID_HEADER};
pub use poller::RuleSetPoller;
