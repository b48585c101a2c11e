pub mod app;
pub mod auth;
pub mod client;
pub mod comments;
pub mod config;
pub mod error;
pub mod extract;
pub mod favorites;
pub mod ratings;
pub mod state;
pub mod users;
pub mod viewed;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;
