//! fintrack keeps a running record of spending and earnings built from bank statements.
//!
//! Statement text is classified line by line ([`classify`]), purchases are sorted into categories
//! through a learning merchant dictionary ([`resolve`]), and the results are added up per month
//! and year ([`model`]) and stored as JSON under `$FINTRACK_HOME` ([`store`]).

pub mod args;
mod backup;
pub mod classify;
pub mod commands;
mod config;
mod error;
pub mod extract;
pub mod model;
pub mod prompt;
pub mod resolve;
pub mod store;
mod utils;


pub use config::Config;
pub use error::{Error, LedgerError, Result};
