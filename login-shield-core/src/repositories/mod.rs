//! Repository traits for the durable side of attempt tracking.
//!
//! Storage backends implement these traits; the services in
//! [`crate::services`] are written against them and never touch a concrete
//! database.

pub mod attempt;

pub use attempt::AttemptRepository;
