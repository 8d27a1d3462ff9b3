//! Domain models and their wire representations.
//!
//! Structs derive `sqlx::FromRow` for the runtime-checked query layer and
//! `serde::Serialize` with renames matching the public JSON contract
//! (`img_url`, `createdAt`, ...). Secret fields (password hash, stored
//! tokens) are never serialized.

pub mod category;
pub mod media;
pub mod menu;
pub mod post;
pub mod product;
pub mod seo;
pub mod tag;
pub mod user;
pub mod visit;

pub use category::{Category, CategoryRef};
pub use media::{About, Banner, Carousel, Contact, Logo, SiteConfig};
pub use menu::Menu;
pub use post::{Post, PostDetail};
pub use product::{Product, ProductDetail};
pub use seo::SeoEntry;
pub use tag::{Tag, TagRef};
pub use user::{AuthorView, User};
pub use visit::DailyVisits;
