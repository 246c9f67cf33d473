//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own cross-collection rules that single repositories cannot see.

pub mod catalog_service;
