// Client for the InterPro precalculated match lookup service.

pub mod client;
pub mod response;

pub use client::{InterproClient, PollSettings, DEFAULT_ENDPOINT};
