//! Core type definitions.

pub mod email;
pub mod id;
pub mod slug;

pub use email::{Email, EmailError};
pub use id::{BannerId, CarouselId, CategoryId, MenuId, PostId, ProductId, SeoEntryId, TagId, UserId, VisitId};
pub use slug::slugify;
