mod crud;
mod joins;
mod models;
mod pool;
mod result_sets;
mod schema;
mod transactions;

pub use models::*;
pub use pool::{pool_blocking, pool_exhausted, transaction_policies};

use crate::{
    crud::crud, joins::joins, result_sets::result_sets, schema::schema,
    transactions::transactions,
};
use log::LevelFilter;
use std::env;
use stow::Connector;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the whole suite against a connected connector.
pub fn execute_tests(connector: &Connector) {
    schema(connector);
    crud(connector);
    joins(connector);
    result_sets(connector);
    transactions(connector);
}

/// Append query parameters to a connection url.
pub fn with_params(url: &str, params: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, params)
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
