pub mod app;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod state;
pub mod terminal;
