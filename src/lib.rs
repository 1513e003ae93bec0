pub mod config;
pub mod error;
pub mod event;
pub mod fetch;
pub mod filter;
pub mod indicator;
pub mod input;
pub mod model;
pub mod pipeline;
pub mod refresh;
pub mod strategy;
pub mod ui;
