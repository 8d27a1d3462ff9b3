//! Request middleware: authentication extractors and visit tracking.

pub mod auth;
pub mod visits;

pub use auth::RequireAuth;
pub use visits::track_visit;
