//! Domain value types produced by a crawl
//!
//! Both types are immutable once built: pagination produces a new
//! [`Category`] for every listing page instead of mutating the old one, and an
//! [`Article`] is written once by the store and never touched again.

mod article;
mod category;

pub use article::{title_key, Article};
pub use category::Category;
