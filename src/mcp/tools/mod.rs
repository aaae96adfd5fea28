//! Tool inputs and their handlers.
//!
//! Each handler takes the deserialized input and returns the reply text; the
//! server turns errors into tool errors.

pub mod image;
pub mod presentation;
pub mod slides;
