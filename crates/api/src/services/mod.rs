//! Business services sitting between the HTTP handlers and the
//! repositories: token minting/verification, password hashing and
//! policy, transactional email, image storage, and the category/tag
//! reference bookkeeping.

pub mod email;
pub mod password;
pub mod references;
pub mod tokens;
pub mod uploads;

pub use email::{EmailError, EmailService};
pub use password::{PasswordError, hash_password, validate_password, verify_password};
pub use references::{ItemKind, ReferenceService};
pub use tokens::{AccessClaims, EmailClaims, TokenError, TokenService};
pub use uploads::{ImageStore, UploadError, UploadKind, ValidatedUpload};
