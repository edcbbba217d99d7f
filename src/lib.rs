//! Mail Assist — rule-based email classification behind an HTTP API.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod mail;
pub mod model;
