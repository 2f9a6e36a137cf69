//! Sales, debt and dealer performance reporting for dealer/manufacturer
//! vehicle portals.

pub mod cli;
pub mod config;
pub mod logging;
pub mod services;
pub mod types;
