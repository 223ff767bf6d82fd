//! Core library for coursekit
//!
//! This crate implements the **Functional Core** of the coursekit application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The coursekit project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`coursekit_core`** (this crate): Pure transformation functions with zero I/O
//! - **`coursekit`**: HTTP, SQLite and CLI orchestration (the Imperative Shell)
//!
//! All functions in this crate are deterministic and side-effect free. They are
//! tested with fixture data only; nothing here opens a socket or a file.
//!
//! # Module Organization
//!
//! - [`query`]: Request URL and query-string construction
//! - [`auth`]: Authentication strategies and the headers they produce
//! - [`pagination`]: Page requests, page metadata and the shared listing shape
//! - [`response`]: Error-body decoding and list-body normalization
//! - [`entity`]: Remote resource shapes
//! - [`catalog`]: Catalog filter/sort/page translation into SQL fragments
//! - [`validation`]: Course form validation
//!
//! # Example Usage
//!
//! ```rust
//! use coursekit_core::query::{build_url, QueryParams};
//!
//! let params = QueryParams::new()
//!     .with("search", "intro")
//!     .with_opt::<i64>("page", None);
//!
//! assert_eq!(
//!     build_url("https://example.com/wp-json/wp/v2/", "/posts", &params),
//!     "https://example.com/wp-json/wp/v2/posts?search=intro"
//! );
//! ```

pub mod auth;
pub mod catalog;
pub mod entity;
pub mod pagination;
pub mod query;
pub mod response;
pub mod validation;
