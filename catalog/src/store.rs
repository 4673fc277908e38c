use crate::{Book, PopularEntry, SimilarityIndex};
use anyhow::{bail, Result};
use std::collections::HashMap;

/// Read-only tables the service answers from. Built once at startup.
#[derive(Debug)]
pub struct Catalog {
    books: Vec<Book>,
    popular: Vec<PopularEntry>,
    index: SimilarityIndex,
    /// Lowercased `books[i].title`, parallel to `books`.
    lowered_titles: Vec<String>,
    pivot_positions: HashMap<String, usize>,
    /// First row in `books` for each title; later editions are ignored.
    first_rows: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(books: Vec<Book>, popular: Vec<PopularEntry>, index: SimilarityIndex) -> Result<Self> {
        let n = index.titles.len();
        if index.scores.len() != n * n {
            bail!("similarity matrix holds {} scores, expected {n}x{n}", index.scores.len());
        }
        if let Some(k) = index.scores.iter().position(|s| !s.is_finite()) {
            bail!("similarity score at row {}, column {} is not finite", k / n, k % n);
        }

        let mut pivot_positions = HashMap::with_capacity(n);
        for (pos, title) in index.titles.iter().enumerate() {
            if pivot_positions.insert(title.clone(), pos).is_some() {
                bail!("pivot title {title:?} appears more than once");
            }
        }

        let mut first_rows = HashMap::new();
        for (row, book) in books.iter().enumerate() {
            first_rows.entry(book.title.clone()).or_insert(row);
        }
        let lowered_titles = books.iter().map(|b| b.title.to_lowercase()).collect();

        Ok(Self { books, popular, index, lowered_titles, pivot_positions, first_rows })
    }

    pub fn books(&self) -> &[Book] { &self.books }

    /// Popular books in display order.
    pub fn popular(&self) -> &[PopularEntry] { &self.popular }

    pub fn titles(&self) -> &[String] { &self.index.titles }

    pub fn similarity_index(&self) -> &SimilarityIndex { &self.index }

    pub fn similarity_row(&self, pos: usize) -> Option<&[f32]> {
        let n = self.index.titles.len();
        if pos >= n { return None; }
        Some(&self.index.scores[pos * n..(pos + 1) * n])
    }

    /// Exact-match position of `title` among the pivot rows.
    pub fn position_of(&self, title: &str) -> Option<usize> {
        self.pivot_positions.get(title).copied()
    }

    pub fn first_book_with_title(&self, title: &str) -> Option<&Book> {
        self.first_rows.get(title).map(|&row| &self.books[row])
    }

    pub(crate) fn lowered_titles(&self) -> &[String] { &self.lowered_titles }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str) -> Book {
        Book { title: title.into(), author: author.into(), cover_image_url: format!("http://img/{title}") }
    }

    #[test]
    fn first_edition_wins() {
        let books = vec![book("Dune", "Herbert"), book("Dune", "Someone Else")];
        let catalog = Catalog::new(books, vec![], SimilarityIndex::default()).unwrap();
        assert_eq!(catalog.first_book_with_title("Dune").unwrap().author, "Herbert");
        assert!(catalog.first_book_with_title("dune").is_none());
    }

    #[test]
    fn rejects_non_square_matrix() {
        let index = SimilarityIndex { titles: vec!["A".into(), "B".into()], scores: vec![1.0, 0.5, 0.5] };
        assert!(Catalog::new(vec![], vec![], index).is_err());
    }

    #[test]
    fn rejects_non_finite_scores() {
        let index = SimilarityIndex { titles: vec!["A".into(), "B".into()], scores: vec![1.0, f32::NAN, 0.5, 1.0] };
        let err = Catalog::new(vec![], vec![], index).unwrap_err();
        assert!(err.to_string().contains("row 0, column 1"));

        let index = SimilarityIndex { titles: vec!["A".into()], scores: vec![f32::INFINITY] };
        assert!(Catalog::new(vec![], vec![], index).is_err());
    }

    #[test]
    fn rejects_duplicate_pivot_titles() {
        let index = SimilarityIndex { titles: vec!["A".into(), "A".into()], scores: vec![1.0; 4] };
        assert!(Catalog::new(vec![], vec![], index).is_err());
    }

    #[test]
    fn rows_follow_pivot_order() {
        let index = SimilarityIndex::from_rows(
            vec!["A".into(), "B".into()],
            vec![vec![1.0, 0.3], vec![0.3, 1.0]],
        )
        .unwrap();
        let catalog = Catalog::new(vec![], vec![], index).unwrap();
        assert_eq!(catalog.position_of("B"), Some(1));
        assert_eq!(catalog.similarity_row(1), Some(&[0.3, 1.0][..]));
        assert_eq!(catalog.similarity_row(2), None);
    }
}
