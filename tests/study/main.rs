#![allow(
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

mod ask_tell;
mod control;
mod failures;
mod resume;
mod workflow;

use latfit::SearchSpace;

pub(crate) fn unit_space() -> SearchSpace {
    SearchSpace::builder()
        .float("a", 0.0, 1.0)
        .build()
        .unwrap()
}

pub(crate) fn temp_path(ext: &str) -> std::path::PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut path = std::env::temp_dir();
    path.push(format!(
        "latfit_study_test_{}_{}.{ext}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    path
}
