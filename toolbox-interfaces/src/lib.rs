//! The `Source` and `Tool` interfaces the dispatch core consumes (§4, §10).
//!
//! Concrete backend drivers are external collaborators: this crate defines the
//! narrow contracts they implement and nothing about how any particular
//! backend actually talks to its wire protocol.

pub mod capability;
pub mod source;
pub mod tool;

pub use capability::{Capability, CapabilitySet};
pub use source::Source;
pub use tool::Tool;
