pub mod client;
pub mod types;

pub use client::KubeStackClient;
pub use types::{classify_error, entry_from_stack, stack_resource};
