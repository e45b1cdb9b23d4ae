//! List site content

use anyhow::Result;
use std::sync::Arc;

use crate::content::model::{BLOG, WORK};
use crate::content::{BlogFields, ContentStore, EntryQuery, WorkFields};

/// List entries of one content type, newest first
pub async fn run(store: Arc<dyn ContentStore>, content_type: &str) -> Result<()> {
    match content_type {
        "work" | "works" => {
            let entries = store.entries(&EntryQuery::newest(WORK)).await?;
            println!("Works ({}):", entries.len());
            for raw in entries {
                let work = raw.decode::<WorkFields>(WORK)?;
                println!(
                    "  {} [{}] thumbnail: {}",
                    work.fields.name,
                    work.id(),
                    work.fields
                        .thumbnail
                        .as_ref()
                        .map(|link| link.id())
                        .unwrap_or("-")
                );
            }
        }
        "post" | "posts" | "blog" => {
            let entries = store.entries(&EntryQuery::newest(BLOG)).await?;
            println!("Posts ({}):", entries.len());
            for raw in entries {
                let post = raw.decode::<BlogFields>(BLOG)?;
                let date = post
                    .sys
                    .created_at
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!("  {} - {} [{}]", date, post.fields.title, post.id());
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: works, posts",
                content_type
            );
        }
    }

    Ok(())
}
