//! Core types and the attendee check-in contract for Rollcall.
//!
//! This crate is deliberately free of HTTP and database dependencies. Backing
//! stores plug in through the collaborator traits in [`store`]; attendee
//! sources are assembled into a [`resolver::SourceRegistry`] at startup and
//! consumed through the [`coordinator::CheckInCoordinator`].

pub mod attendee;
pub mod coordinator;
pub mod error;
pub mod identifier;
pub mod resolver;
pub mod source;
pub mod store;

pub use error::{Error, Result};
pub use identifier::{AttendeeId, SourceType};

#[cfg(test)]
mod tests;
