//! Model Context Protocol surface.
//!
//! Every deck operation is exposed as an MCP tool over stdio. Start the
//! server with the `deckmill` binary.

mod server;
pub mod tools;

pub use server::{DeckServer, run_server};
