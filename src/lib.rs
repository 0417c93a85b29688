// src/lib.rs
pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod prefs;
pub mod session;
pub mod tmdb;
