//! Progress UI (bars and spinner) for uploads, conversions and downloads.

use std::sync::Arc;
use std::time::Duration;

use conversiontools::{ConversionProgressCallback, ProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress bars shared by one CLI run. Disabled bars are hidden no-ops.
#[derive(Debug, Clone)]
pub struct ProgressUi {
    multi: Option<MultiProgress>,
}

impl ProgressUi {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            multi: enabled.then(MultiProgress::new),
        }
    }

    /// A byte-count bar and the callback that drives it.
    pub(crate) fn transfer(&self, label: &'static str) -> (ProgressBar, ProgressCallback) {
        let bar = self.bar();
        bar.set_style(
            ProgressStyle::with_template("{msg:>10} [{bar:30}] {bytes}/{total_bytes}")
                .map(|style| style.progress_chars("=> "))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(label);

        let driver = bar.clone();
        let callback: ProgressCallback = Arc::new(move |event| {
            if let Some(total) = event.total {
                driver.set_length(total);
            }
            driver.set_position(event.loaded);
        });
        (bar, callback)
    }

    /// A spinner showing task status and server-reported percent.
    pub(crate) fn conversion(&self) -> (ProgressBar, ConversionProgressCallback) {
        let spinner = match &self.multi {
            Some(multi) => {
                let spinner = multi.add(ProgressBar::new_spinner());
                spinner.enable_steady_tick(Duration::from_millis(100));
                spinner
            }
            None => ProgressBar::hidden(),
        };
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Waiting for conversion...");

        let driver = spinner.clone();
        let callback: ConversionProgressCallback = Arc::new(move |event| {
            driver.set_message(format!(
                "Converting [{}] {}%",
                event.status, event.percent
            ));
        });
        (spinner, callback)
    }

    fn bar(&self) -> ProgressBar {
        match &self.multi {
            Some(multi) => multi.add(ProgressBar::new(0)),
            None => ProgressBar::hidden(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conversiontools::{ConversionProgressEvent, ProgressEvent, TaskStatus};

    #[test]
    fn transfer_callback_updates_length_and_position() {
        let ui = ProgressUi::new(false);
        let (bar, callback) = ui.transfer("Upload");

        callback(ProgressEvent::new(40, Some(100)));

        assert_eq!(bar.length(), Some(100));
        assert_eq!(bar.position(), 40);
    }

    #[test]
    fn conversion_callback_sets_message() {
        let ui = ProgressUi::new(false);
        let (spinner, callback) = ui.conversion();

        callback(ConversionProgressEvent {
            task_id: "0123456789abcdef0123456789abcdef".into(),
            status: TaskStatus::Running,
            percent: 42,
        });

        assert_eq!(spinner.message(), "Converting [RUNNING] 42%");
        spinner.finish_and_clear();
    }
}
