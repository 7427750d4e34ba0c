pub mod attachment;
pub mod page;
pub mod schema;
pub mod search;
pub mod sort;

pub use attachment::{CreateDefaultAttachment, DefaultAttachment};
pub use page::{ArticleSet, PageRequest, DEFAULT_PAGE_SIZE};
pub use search::SearchTerm;
pub use sort::SortKey;
