#![allow(dead_code)]

// tests/common/mod.rs
use std::future::Future;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    party_test_support::logging::init();
}

/// Drive an async block from synchronous test code such as a proptest body.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime")
        .block_on(future)
}
