//! A thin typed wrapper over the orchestrator's REST verbs, plus the diff
//! engine used to decide whether a desired application equals, scales, or
//! updates the observed one.

mod client;
mod diff;

pub use client::{Client, RawResponse};
pub use diff::{combine, is_port_update, is_scale_only_update, is_update};
