//! Market Briefing - morning US market digest for Telegram
//!
//! This library fetches index, sector, FX, commodity and Treasury quotes,
//! news headlines and the earnings calendar, assembles them into one HTML
//! report and delivers it to every Telegram chat the bot knows about.

pub mod cli;
pub mod commands;
pub mod config;
pub mod destinations;
pub mod dispatcher;
pub mod error;
pub mod pipeline;
pub mod pricing;
pub mod reports;
pub mod scraping;
pub mod sections;
pub mod telegram;
pub mod utils;
