pub mod addressing;
pub mod codec;
pub mod diff;
pub mod gitlab;
pub mod query_filter;
