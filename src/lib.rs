//! Chapter Succession - leadership succession pipeline for chapters.
//!
//! A succession cycle moves candidates from nomination through weighted
//! evaluation, outreach, regional council review and committee decision.
//! The crate follows a ports-and-adapters layout: `domain` holds the pure
//! model, `ports` the storage and notification traits, `application` the
//! command and query handlers, and `adapters` the PostgreSQL, in-memory,
//! event and HTTP implementations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
