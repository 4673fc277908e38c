pub mod model;
pub mod persist;
pub mod recommend;
pub mod search;
pub mod store;

pub use model::{Book, PopularEntry, Recommendation, SearchHit, SimilarityIndex};
pub use recommend::{recommend, RecommendError, RECOMMENDATION_COUNT};
pub use search::{search, MAX_SEARCH_RESULTS};
pub use store::Catalog;
