use log::{error, info};

use crate::backend::MetricsBackend;
use crate::error::ComparisonFetchError;
use crate::models::ComparisonRow;

/// Fetches one summary row per district, in backend order.
///
/// An empty selection returns immediately without contacting the backend.
pub async fn compare<B>(backend: &B, district_ids: &[u32]) -> Result<Vec<ComparisonRow>, ComparisonFetchError>
where
    B: MetricsBackend + ?Sized,
{
    if district_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = backend.compare(district_ids).await?;
    info!("Compared {} districts, got {} rows", district_ids.len(), rows.len());
    Ok(rows)
}

/// Selection and shown rows of the comparison view.
///
/// Rows always belong to the current selection: any change to the selection
/// clears them before anything new is fetched.
#[derive(Debug, Default)]
pub struct ComparisonPanel {
    selection: Vec<u32>,
    rows: Vec<ComparisonRow>,
}

impl ComparisonPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the district, or removes it if already selected.
    pub fn toggle(&mut self, district_id: u32) {
        self.rows.clear();
        match self.selection.iter().position(|&id| id == district_id) {
            Some(index) => {
                self.selection.remove(index);
            }
            None => self.selection.push(district_id),
        }
    }

    pub fn reset(&mut self) {
        self.rows.clear();
        self.selection.clear();
    }

    pub fn selection(&self) -> &[u32] {
        &self.selection
    }

    pub fn is_selected(&self, district_id: u32) -> bool {
        self.selection.contains(&district_id)
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// Fetches rows for the current selection. On failure nothing is shown.
    pub async fn run<B>(&mut self, backend: &B) -> Result<&[ComparisonRow], ComparisonFetchError>
    where
        B: MetricsBackend + ?Sized,
    {
        self.rows.clear();
        match compare(backend, &self.selection).await {
            Ok(rows) => {
                self.rows = rows;
                Ok(&self.rows)
            }
            Err(e) => {
                error!("Compare failed: {}", e);
                Err(e)
            }
        }
    }
}
