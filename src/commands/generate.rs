//! Generate the build-time snapshot

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::content::ContentStore;
use crate::generator::Generator;
use crate::Folio;

/// Render every page into the public directory
pub async fn run(folio: &Folio, store: Arc<dyn ContentStore>) -> Result<()> {
    let start = std::time::Instant::now();

    let composer = folio.composer(store)?;
    let snapshot = Generator::new(&composer)
        .generate(&folio.public_dir, &folio.static_dir)
        .await
        .context("Generation failed")?;

    tracing::info!(
        "Generated works page and {} posts into {:?}",
        snapshot.posts.len(),
        folio.public_dir
    );
    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
