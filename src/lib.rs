pub mod config;
pub mod consts;
pub mod error;
pub mod export;
pub mod generator;
pub mod http;
pub mod prompts;
pub mod report;
pub mod service;
pub mod store;
