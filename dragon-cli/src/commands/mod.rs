pub(crate) mod cache;
pub(crate) mod crawl;
pub(crate) mod fetch;
pub(crate) mod load;
pub(crate) mod normalize;
