use crate::{Catalog, Recommendation};
use thiserror::Error;

pub const RECOMMENDATION_COUNT: usize = 5;

#[derive(Error, Debug, PartialEq)]
pub enum RecommendError {
    /// The title has no exact match among the pivot rows.
    #[error("book not found in similarity index: {title:?}")]
    NotFound { title: String },

    #[error("recommendation lookup failed: {0}")]
    Internal(String),
}

/// Top [`RECOMMENDATION_COUNT`] titles most similar to `title`.
///
/// Scores are ranked descending with a stable sort, so equal scores keep
/// matrix column order. The queried title itself is never returned. Each
/// result takes its author and cover from the first metadata row with that
/// title.
pub fn recommend(catalog: &Catalog, title: &str) -> Result<Vec<Recommendation>, RecommendError> {
    let pos = catalog
        .position_of(title)
        .ok_or_else(|| RecommendError::NotFound { title: title.to_string() })?;
    let row = catalog
        .similarity_row(pos)
        .ok_or_else(|| RecommendError::Internal(format!("no similarity row at position {pos}")))?;

    let mut ranked: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
    // scores are finite (checked by Catalog::new), so total_cmp is plain numeric order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let titles = catalog.titles();
    ranked
        .into_iter()
        .filter(|(col, _)| *col != pos)
        .take(RECOMMENDATION_COUNT)
        .map(|(col, _)| -> Result<Recommendation, RecommendError> {
            let other = &titles[col];
            let book = catalog
                .first_book_with_title(other)
                .ok_or_else(|| RecommendError::Internal(format!("no metadata for pivot title {other:?}")))?;
            Ok(Recommendation {
                title: book.title.clone(),
                author: book.author.clone(),
                cover_image_url: book.cover_image_url.clone(),
            })
        })
        .collect()
}
