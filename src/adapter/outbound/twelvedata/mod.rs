//! Twelve Data market-data origin.

mod client;
mod dto;

pub use client::{TwelveData, API_KEY_ENV};
pub(crate) use client::parse_host;
