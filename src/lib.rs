pub mod app;
pub mod catalog;
pub mod columns;
pub mod config;
pub mod consortium;
pub mod domain;
pub mod error;
pub mod integrate;
pub mod output;
pub mod table;
pub mod toxicity;
pub mod upload;
