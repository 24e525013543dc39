//! Progress bar support (requires `progress` feature)

use crate::options::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Create a progress bar sized in tasks.
#[must_use]
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} entries ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

/// A [`ProgressCallback`] driving `bar`.
///
/// The length is taken from the first update, since the number of entries is
/// only known once planning is done.
#[must_use]
pub fn progress_callback(bar: ProgressBar) -> ProgressCallback {
    Arc::new(move |done, total| {
        if bar.length() != Some(total) {
            bar.set_length(total);
        }
        bar.set_position(done);
    })
}
