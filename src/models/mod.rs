//! Data models for the CertManager backend.
//!
//! Field names serialize in camelCase to match the web client's record shapes.

mod award;
mod certificate;
mod notification;
mod record;
mod user;

pub use award::*;
pub use certificate::*;
pub use notification::*;
pub use record::*;
pub use user::*;
