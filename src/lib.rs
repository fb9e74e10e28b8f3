// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup wiring
// - domain: account and profile models
// - application: ports, validators, token/password services, use cases
// - infrastructure: Postgres adapters
// - presentation: HTTP handlers, extractors and routing

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
