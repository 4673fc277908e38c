use serde::{Deserialize, Serialize};

/// One row of the book metadata table. Titles repeat across editions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(rename = "image")]
    pub cover_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularEntry {
    pub title: String,
    pub author: String,
    #[serde(rename = "image")]
    pub cover_image_url: String,
    #[serde(rename = "num_ratings")]
    pub rating_count: u32,
    pub avg_rating: f32,
}

/// Pivot titles plus the square similarity matrix aligned to them.
///
/// `scores` is row-major: `scores[i * n + j]` is the similarity between
/// `titles[i]` and `titles[j]`, where `n = titles.len()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarityIndex {
    pub titles: Vec<String>,
    pub scores: Vec<f32>,
}

impl SimilarityIndex {
    /// Build from one `Vec` per matrix row, as exported by the training job.
    pub fn from_rows(titles: Vec<String>, rows: Vec<Vec<f32>>) -> anyhow::Result<Self> {
        let n = titles.len();
        if rows.len() != n {
            anyhow::bail!("similarity matrix has {} rows, pivot has {} titles", rows.len(), n);
        }
        let mut scores = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                anyhow::bail!("similarity row {i} has {} columns, expected {n}", row.len());
            }
            scores.extend(row);
        }
        Ok(Self { titles, scores })
    }

    pub fn dim(&self) -> usize { self.titles.len() }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub author: String,
    pub cover_image_url: String,
}
