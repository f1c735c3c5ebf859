pub mod gitlab;

pub use gitlab::{GitLabProvider, Outcome, Resolution};
