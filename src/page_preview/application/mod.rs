pub mod config;
pub mod error;
pub mod fallback_resolver;
pub mod preview_generator;
pub mod preview_service;
pub mod upload_stage;
