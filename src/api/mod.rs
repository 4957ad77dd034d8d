//! HTTP surface: the redirect endpoint, link management under `/api` and the
//! health check.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
