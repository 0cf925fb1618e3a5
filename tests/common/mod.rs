//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration tests:
//! - Binary path resolution (via `xhep_build_binary`)
//! - Project fixtures (via `helpers`)

pub(crate) mod helpers;

#[allow(unused_imports)]
pub(crate) use helpers::{MINIMAL_MODULE, create_project, xhep_build_binary};
