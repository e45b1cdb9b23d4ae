//! Content module - content store access, thumbnails and Markdown

pub mod client;
mod markdown;
pub mod memory;
pub mod model;
mod thumbnails;

pub use client::{ContentStore, ContentfulClient};
pub use markdown::{html_escape, language_hint, MarkdownRenderer, MarkdownTheme};
pub use memory::MemoryStore;
pub use model::{Asset, BlogFields, Entry, EntryQuery, Link, RawEntry, WorkFields};
pub use thumbnails::{thumbnail_ids, ThumbnailMap, ThumbnailResolution, ThumbnailResolver};
