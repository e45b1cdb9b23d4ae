//! Configuration module

mod contentful;
mod site;

pub use contentful::ContentfulConfig;
pub use site::FetchTiming;
pub use site::ServerConfig;
pub use site::SiteConfig;
pub use site::DEFAULT_THUMBNAIL;
