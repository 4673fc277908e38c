use crate::{Catalog, SearchHit};

pub const MAX_SEARCH_RESULTS: usize = 5;

/// Case-insensitive title substring search over the metadata table.
///
/// Blank or missing queries yield no hits. Matches come back in table order,
/// so several editions of one title may all appear.
pub fn search(catalog: &Catalog, query: Option<&str>) -> Vec<SearchHit> {
    let query = match query {
        Some(q) if !q.trim().is_empty() => q.to_lowercase(),
        _ => return Vec::new(),
    };

    catalog
        .lowered_titles()
        .iter()
        .zip(catalog.books())
        .filter(|(lowered, _)| lowered.contains(&query))
        .take(MAX_SEARCH_RESULTS)
        .map(|(_, book)| SearchHit { title: book.title.clone(), author: book.author.clone() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Book, SimilarityIndex};

    fn catalog(titles: &[&str]) -> Catalog {
        let books = titles
            .iter()
            .map(|t| Book { title: t.to_string(), author: "anon".into(), cover_image_url: String::new() })
            .collect();
        Catalog::new(books, vec![], SimilarityIndex::default()).unwrap()
    }

    #[test]
    fn empty_and_missing_queries_return_nothing() {
        let c = catalog(&["Harry Potter"]);
        assert!(search(&c, None).is_empty());
        assert!(search(&c, Some("")).is_empty());
        assert!(search(&c, Some("   ")).is_empty());
    }

    #[test]
    fn matches_ignore_case() {
        let c = catalog(&["Harry Potter", "The Hobbit", "HARRY'S GAME"]);
        let titles: Vec<_> = search(&c, Some("hArRy")).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["Harry Potter", "HARRY'S GAME"]);
    }

    #[test]
    fn caps_at_five_in_table_order() {
        let c = catalog(&["a1", "b", "a2", "a3", "a4", "a5", "a6"]);
        let titles: Vec<_> = search(&c, Some("a")).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["a1", "a2", "a3", "a4", "a5"]);
    }

    #[test]
    fn pattern_characters_are_literal() {
        let c = catalog(&["What? (A Novel)", "Whatever"]);
        let titles: Vec<_> = search(&c, Some("(a")).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["What? (A Novel)"]);
    }
}
