//! Story generation and retrieval.
//!
//! [`StoryService`] ties the storage traits, the upstream collaborators and
//! the card renderer together. It is constructed explicitly from its parts
//! and holds no global state, so the HTTP layer shares one instance behind
//! an `Arc` and tests build their own from doubles.

pub mod error;
mod locks;
mod service;


pub use error::{Error, Result};
pub use locks::{EntityLease, EntityLocks};
pub use service::{GeneratedStory, MAX_TOKEN_ATTEMPTS, StoryConfig, StoryService};
