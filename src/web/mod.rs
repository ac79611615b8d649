//! Web front end for the task board.
//!
//! Server-rendered pages over the board operations; every mutation answers
//! with a redirect back to the listing.

mod flash;
mod server;
pub mod templates;

pub use server::{BoardServer, build_router, start_server};
