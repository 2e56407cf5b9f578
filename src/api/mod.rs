//! Deployment shell
//!
//! Serves the presentation bundle and the stub endpoints the browser build
//! expects. No game logic lives here; the engine runs next to the renderer.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::ApiServer;
