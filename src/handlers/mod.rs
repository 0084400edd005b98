// handlers/mod.rs - datasource service handlers
//
// public  → no session required (/, /health)
// session → session lifecycle (/api/session)
// grid    → per-grid reads and filter changes (/api/grid/:grid/*), session required

pub mod grid;
pub mod public;
pub mod session;
