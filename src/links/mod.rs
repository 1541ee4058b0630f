//! Link module for turning candidate links into product links
//!
//! This module contains:
//! - Redirect resolution with bounded HEAD probes
//! - The preparation pipeline that resolves, validates, classifies, and
//!   de-duplicates a batch of candidate links

mod prepare;
mod resolver;

pub use prepare::{LinkOutcome, LinkPreparer, PreparationStats, PreparedLinks};
pub use resolver::{build_resolver_client, RedirectResolver};
