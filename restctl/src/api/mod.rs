//! The HTTP surface: handlers and the models they return.

pub mod handlers;
pub mod models;
