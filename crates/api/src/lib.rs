//! HTTP API for publishing announcements and texting them to member groups.

pub mod middleware;
pub mod routes;
pub mod state;
