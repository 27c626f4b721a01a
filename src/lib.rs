//! Before/after site documentation: photo normalization, report
//! compositing and time-bounded session persistence.
//!
//! Captured files go through [`photo::normalize_batch`] and are appended to
//! a [`Location`] held by a [`Session`]. The session mirrors its locations
//! into a [`SessionStore`] with debounced writes, and
//! [`report::generate_report`] renders one location into a single JPEG.

pub mod config;
pub mod error;
pub mod photo;
pub mod report;
pub mod state;

pub use config::Config;
pub use error::{SnapError, SnapResult};
pub use report::{Delivered, Delivery, ReportImage, ShareTarget};
pub use state::data::{Location, LocationStatus, SessionData, ShootMode};
pub use state::session::Session;
pub use state::store::{MemoryBackend, SessionBackend, SessionStore, SqliteBackend};
pub use state::workspace::Workspace;
