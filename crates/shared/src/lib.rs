pub mod abstract_trait;
pub mod cache;
pub mod config;
pub mod di;
pub mod domain;
pub mod errors;
pub mod model;
pub mod repository;
pub mod service;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
