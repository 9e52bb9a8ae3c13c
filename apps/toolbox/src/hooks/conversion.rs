use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use tracing::{debug, info};

use crate::services::image_convert::{
    check_size, convert, ConversionJob, ConversionStatus, ConvertOptions, ConvertedFile,
};
use crate::state::{use_app_actions, AppActions};

/// Drives a sequential batch conversion. `jobs` mirrors the input list and
/// is the only state the loop shares with the UI.
#[derive(Clone, Copy)]
pub struct ConversionHandle {
    actions: AppActions,
    pub jobs: Signal<Vec<ConversionJob>>,
    pub outputs: Signal<Vec<ConvertedFile>>,
    pub is_running: Signal<bool>,
}

impl ConversionHandle {
    pub fn start(&self, files: Vec<(String, Vec<u8>)>, options: ConvertOptions, limit: u64) {
        if *self.is_running.read() || files.is_empty() {
            return;
        }
        run_batch(self.actions, self.jobs, self.outputs, self.is_running, files, options, limit);
    }

    pub fn clear(&self) {
        if *self.is_running.read() {
            return;
        }
        let mut jobs = self.jobs;
        let mut outputs = self.outputs;
        jobs.set(Vec::new());
        outputs.set(Vec::new());
    }
}

pub fn use_conversion() -> ConversionHandle {
    ConversionHandle {
        actions: use_app_actions(),
        jobs: use_signal(Vec::new),
        outputs: use_signal(Vec::new),
        is_running: use_signal(|| false),
    }
}

fn run_batch(
    actions: AppActions,
    mut jobs: Signal<Vec<ConversionJob>>,
    mut outputs: Signal<Vec<ConvertedFile>>,
    mut is_running: Signal<bool>,
    files: Vec<(String, Vec<u8>)>,
    options: ConvertOptions,
    limit: u64,
) {
    jobs.set(
        files
            .iter()
            .map(|(name, bytes)| ConversionJob::pending(name.clone(), bytes.len()))
            .collect(),
    );
    outputs.set(Vec::new());
    is_running.set(true);

    spawn(async move {
        let total = files.len();
        let mut failed = 0usize;
        for (index, (name, bytes)) in files.into_iter().enumerate() {
            set_status(&mut jobs, index, ConversionStatus::Converting);
            TimeoutFuture::new(0).await;

            let result = check_size(&name, bytes.len(), limit)
                .and_then(|()| convert(&name, &bytes, options));
            match result {
                Ok(file) => {
                    debug!(%name, output = %file.name, size = file.bytes.len(), "image converted");
                    set_status(
                        &mut jobs,
                        index,
                        ConversionStatus::Done {
                            output_size: file.bytes.len(),
                        },
                    );
                    outputs.write().push(file);
                }
                Err(err) => {
                    failed += 1;
                    set_status(&mut jobs, index, ConversionStatus::Failed(err.to_string()));
                }
            }
        }

        is_running.set(false);
        info!(total, failed, format = options.format.label(), "conversion batch finished");
        if failed == 0 {
            actions.set_operation_success(format!("Converted {total} image(s)"));
        } else {
            actions.set_operation_error(format!("{failed} of {total} image(s) failed to convert"));
        }
    });
}

fn set_status(jobs: &mut Signal<Vec<ConversionJob>>, index: usize, status: ConversionStatus) {
    if let Some(job) = jobs.write().get_mut(index) {
        job.status = status;
    }
}
