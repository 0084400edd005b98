pub mod adaptor;
pub mod admin;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod page;
pub mod server;
