pub mod app;
pub mod catalog;
pub mod cli;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod media;
pub mod search;
pub mod storage;
pub mod tmdb;
pub mod watchlist;
