pub mod controller;
pub mod fetcher;
pub mod format;
pub mod pagination;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_support;
