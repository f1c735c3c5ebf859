mod cache;
mod commits;
mod core;

pub use self::core::{GitLabClient, DEFAULT_HOST};
