//! InternLink API: internship recommendations for students.
//!
//! The ranking core (`recommendation::engine::rank`) is usable in-process;
//! the binary wraps it, together with the chat assistant, in an HTTP service.

pub mod assistant;
pub mod config;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod recommendation;
pub mod routes;
pub mod state;
