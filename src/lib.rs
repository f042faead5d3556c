pub mod app;
pub mod config;
pub mod constants;
pub mod engine;
pub mod player;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
