use crate::app::error::{BuildError, BuildResult};
use crate::app::models::{BuildConfig, BuildOptions, BuildPaths};
use crate::app::{cleaner, copier, css, html, js, sass};
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;

/// Where a build currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Cleaning,
    Processing,
    PurgePruning,
    Done,
}

/// What a finished build went through and produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub phases: Vec<Phase>,
    pub written: Vec<PathBuf>,
    pub pruned: Vec<PathBuf>,
}

impl BuildReport {
    fn enter(&mut self, phase: Phase) {
        log::debug!("Build phase: {:?}", phase);
        self.phases.push(phase);
    }

    pub fn phase(&self) -> Phase {
        self.phases.last().copied().unwrap_or(Phase::Idle)
    }
}

/// Runs the whole build: clean, the concurrent processing stages, then
/// the intermediate prune when purging.
pub fn build(
    paths: &BuildPaths,
    config: &BuildConfig,
    options: &BuildOptions,
) -> BuildResult<BuildReport> {
    let mut report = BuildReport::default();

    report.enter(Phase::Cleaning);
    cleaner::wipe(paths)?;

    if options.clean_only {
        report.enter(Phase::Done);
        return Ok(report);
    }

    report.enter(Phase::Processing);
    report.written = process(paths, config, options)?;

    if options.purge() {
        report.enter(Phase::PurgePruning);
        report.pruned = cleaner::prune_intermediate(paths)?;
    }

    report.enter(Phase::Done);
    Ok(report)
}

/// Fans the independent stages out on scoped threads and waits for all of
/// them. HTML and Sass share one thread because the purge reads the HTML
/// output. The first stage to fail decides the returned error.
fn process(
    paths: &BuildPaths,
    config: &BuildConfig,
    options: &BuildOptions,
) -> BuildResult<Vec<PathBuf>> {
    let first_error: Mutex<Option<BuildError>> = Mutex::new(None);
    let record = |err: BuildError| {
        let mut slot = first_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot.as_ref() {
            Some(_) => log::error!("❌ {}", err),
            None => *slot = Some(err),
        }
    };
    let settle = |result: BuildResult<Vec<PathBuf>>| match result {
        Ok(files) => files,
        Err(err) => {
            record(err);
            Vec::new()
        }
    };

    let mut written = thread::scope(|s| {
        let handles = [
            (
                "assets",
                s.spawn(|| settle(copier::copy_assets(paths, config, options))),
            ),
            ("css", s.spawn(|| settle(css::process_css(paths, config, options)))),
            ("js", s.spawn(|| settle(js::process_js(paths, config, options)))),
            (
                "html+sass",
                s.spawn(|| {
                    settle(html::process_html(paths, options).and_then(|mut written| {
                        written.extend(sass::compile_themes(paths, config, options)?);
                        Ok(written)
                    }))
                }),
            ),
        ];

        let mut written = Vec::new();
        for (stage, handle) in handles {
            match handle.join() {
                Ok(files) => written.extend(files),
                Err(_) => record(BuildError::TaskPanicked { stage }),
            }
        }
        written
    });

    let first_error = first_error
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(err) = first_error {
        return Err(err);
    }

    written.sort();
    Ok(written)
}
