//! Shared test helpers for `pinesync-core` integration tests.
//!
//! In-memory stand-ins for the gateway and cache-writer ports so handler and
//! pipeline tests can focus on behaviour instead of HTTP plumbing.

#![allow(dead_code)]

pub mod cache;
pub mod gateway;
