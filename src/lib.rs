pub mod config;
pub mod crest;
pub mod error;
pub mod fixtures;
pub mod fpl_fetch;
pub mod http_client;
pub mod match_feed;
pub mod odds_fetch;
pub mod pipeline;
pub mod provider;
pub mod roster;
pub mod schedule;
pub mod standings;
pub mod state;
