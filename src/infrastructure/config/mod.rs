//! Configuration sections and loading.

pub mod audit;
pub mod cache;
pub mod logging;
pub mod origin;
pub mod settings;
pub mod shutdown;

pub use settings::Config;
