mod eager;
mod lists;
mod session_loss;
mod trades;

use crate::{eager::eager, lists::lists, session_loss::session_loss, trades::trades};
use log::LevelFilter;
use primed::Session;
use std::env;

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

/// Run the whole suite against a live session, it is handed from one scenario to the next.
pub async fn execute_tests<S: Session>(session: S) {
    let session = trades(session).await;
    let session = lists(session).await;
    let session = session_loss(session).await;
    eager(session).await;
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
