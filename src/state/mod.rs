/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The in-memory location list and its mutations (workspace.rs)
/// - Persisted session record and its TTL (store.rs)
/// - Debounced write scheduling (autosave.rs)
/// - The live session tying them together (session.rs)

pub mod autosave;
pub mod data;
pub mod session;
pub mod store;
pub mod workspace;
