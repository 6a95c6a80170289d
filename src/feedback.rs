use crate::errors::*;
use crate::pipeline::Stage;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub trait Feedback {
    fn new(total: usize) -> Self;

    fn begin(&self, stage: Stage);

    fn done(&self, stage: Stage, result: &Result<()>);

    /// Run `f` while an external tool owns the terminal.
    #[inline(always)]
    fn suspend<T, F: FnOnce() -> T>(&self, f: F) -> T {
        f()
    }

    #[inline(always)]
    fn finish(&self) {}
}

pub struct Silent;

impl Feedback for Silent {
    #[inline(always)]
    fn new(_total: usize) -> Silent {
        Silent
    }

    fn begin(&self, stage: Stage) {
        info!("Step {}: {}", stage.number(), stage.describe());
    }

    fn done(&self, stage: Stage, result: &Result<()>) {
        match result {
            Ok(()) => info!("Step {} completed", stage.number()),
            Err(err) => error!("Step {} failed: {:#}", stage.number(), err),
        }
    }
}

pub struct Verbose(ProgressBar);

impl Feedback for Verbose {
    fn new(total: usize) -> Verbose {
        console::set_colors_enabled(true);

        let pb = ProgressBar::new(total as u64);
        pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(4));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(" [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Verbose(pb)
    }

    fn begin(&self, stage: Stage) {
        self.0.println(format!(
            "{} {}",
            console::style(format!("[{}]", stage.number())).bold(),
            console::style(stage.describe()).yellow()
        ));
        self.0.set_message(stage.describe());
    }

    fn done(&self, stage: Stage, result: &Result<()>) {
        let line = match result {
            Ok(()) => console::style(format!("Step {} completed", stage.number())).green(),
            Err(err) => console::style(format!("Step {} failed: {:#}", stage.number(), err)).red(),
        };
        self.0.println(line.to_string());
        self.0.inc(1);
    }

    #[inline]
    fn suspend<T, F: FnOnce() -> T>(&self, f: F) -> T {
        self.0.suspend(f)
    }

    #[inline]
    fn finish(&self) {
        self.0.finish_with_message("done");
    }
}
