pub mod aggregate;
pub mod config;
pub mod counties;
pub mod dashboard;
pub mod derive;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod model;
pub mod output;
pub mod rank;
pub mod utility;
