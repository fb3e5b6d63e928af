pub mod commentary;
pub mod prompts;

#[cfg(feature = "gemini")]
pub mod client;
#[cfg(feature = "gemini")]
pub mod types;

pub use commentary::*;

#[cfg(feature = "gemini")]
pub use client::*;
