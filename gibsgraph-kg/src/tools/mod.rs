//! Query tooling used around the graph database

pub mod cypher_guard;

pub use cypher_guard::CypherGuard;
