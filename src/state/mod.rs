//! State module for tracking links and extraction jobs
//!
//! # Components
//!
//! - `LinkDisposition`: what the preparation pipeline decided for each candidate link
//! - `JobStatus`: normalized status of an asynchronous extraction job

mod job_state;
mod link_state;

// Re-export main types
pub use job_state::JobStatus;
pub use link_state::LinkDisposition;
