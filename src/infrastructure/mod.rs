pub mod source_fetcher;

pub use source_fetcher::SourceFetcher;
