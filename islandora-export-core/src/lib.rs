#![doc = "islandora-export-core: core logic library for islandora-export."]

//! Fetches node metadata from an Islandora repository, walks the
//! membership graph and re-renders it as aggregated workbench CSV or a
//! Crossref deposit.
//!
//! # Pipeline
//! - [`fetch::HttpFetcher`] implements [`contract::Fetcher`] over reqwest
//!   with the advisory [`cache::DiskCache`] in front.
//! - [`traverse::traverse`] walks the graph breadth first into
//!   [`entity::Entity`] values built on the typed [`field`] model.
//! - [`aggregate::aggregate`] merges CSV exports of containers.
//! - [`crossref::project`] and [`crossref::render::to_xml`] produce the
//!   deposit.
//!
//! Logging setup and argument parsing live in the CLI crate.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod contract;
pub mod crossref;
pub mod entity;
pub mod error;
pub mod fetch;
pub mod field;
pub mod schema;
pub mod traverse;
pub mod warm;
pub mod workbench;
