mod client;
mod elapsed;
mod provider;
mod status;
mod types;

pub use client::DEFAULT_HOST;
pub use provider::{GitLabProvider, Resolution};
pub use status::Outcome;
