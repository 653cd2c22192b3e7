//! Filesystem persister writing one CSV and one PDF per page

use crate::config::OutputConfig;
use crate::output::csv_output::render_csv;
use crate::output::pdf_output::render_pdf;
use crate::output::traits::{OutputResult, PageRecord, PagePersister, SavedPage};
use crate::url::slugify;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Writes pages to `<root>/csv/<slug>.csv` and `<root>/pdf/<slug>.pdf`
#[derive(Debug, Clone)]
pub struct FilePersister {
    csv_dir: PathBuf,
    pdf_dir: PathBuf,
}

impl FilePersister {
    /// Creates a persister rooted at `root`; directories are created on first write
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            csv_dir: root.join("csv"),
            pdf_dir: root.join("pdf"),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            csv_dir: config.csv_dir(),
            pdf_dir: config.pdf_dir(),
        }
    }

    pub fn csv_dir(&self) -> &Path {
        &self.csv_dir
    }

    pub fn pdf_dir(&self) -> &Path {
        &self.pdf_dir
    }
}

#[async_trait]
impl PagePersister for FilePersister {
    async fn persist(&self, record: PageRecord) -> OutputResult<SavedPage> {
        tokio::fs::create_dir_all(&self.csv_dir).await?;
        tokio::fs::create_dir_all(&self.pdf_dir).await?;

        let slug = slugify(&record.url);

        let csv_path = self.csv_dir.join(format!("{slug}.csv"));
        tokio::fs::write(&csv_path, render_csv(&record)?).await?;

        let pdf_path = self.pdf_dir.join(format!("{slug}.pdf"));
        write_durable(&pdf_path, &render_pdf(&record)?).await?;

        tracing::info!("  - Saved CSV and PDF for: {}", slug);

        Ok(SavedPage {
            url: record.url,
            slug,
            csv_path,
            pdf_path,
        })
    }
}

/// Writes `bytes` to `path` and waits until they reach storage
async fn write_durable(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}
