pub mod filter;
pub mod grid;
pub mod session;
