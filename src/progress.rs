use anyhow::Result;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

const SPINNER_TICKS_BRAILLE: [&str; 9] = ["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈", "✔"];
const SPINNER_TICKS_ASCII: &str = "|/-\\+";

/// Every command reads, transforms, then writes.
#[derive(Clone, Copy)]
pub enum Stage {
    Fetch,
    Transform,
    Write,
}

impl Stage {
    const TOTAL: u8 = 3;

    const fn index(self) -> u8 {
        match self {
            Self::Fetch => 1,
            Self::Transform => 2,
            Self::Write => 3,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Fetch => "Fetch",
            Self::Transform => "Transform",
            Self::Write => "Write",
        }
    }

    fn message(self, label: &str) -> String {
        let prefix = format!("[{}/{}]", self.index(), Self::TOTAL);
        format!(
            "{} {}: {}",
            prefix.bright_yellow().bold(),
            self.label().bright_cyan().bold(),
            label.bright_white().bold()
        )
    }
}

pub struct ProgressState {
    multi: MultiProgress,
    style: ProgressStyle,
}

impl ProgressState {
    pub(crate) fn new(enabled: bool) -> Self {
        let multi = MultiProgress::new();
        multi.set_draw_target(if enabled {
            ProgressDrawTarget::stderr_with_hz(15)
        } else {
            ProgressDrawTarget::hidden()
        });
        let style = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let style = if is_dumb_term() {
            style.tick_chars(SPINNER_TICKS_ASCII)
        } else {
            style.tick_strings(&SPINNER_TICKS_BRAILLE)
        };
        Self { multi, style }
    }

    /// A stderr writer that hides the spinners while a line is printed, so log
    /// output never interleaves with a redraw.
    pub(crate) fn log_writer(&self) -> LogWriter {
        LogWriter {
            multi: self.multi.clone(),
        }
    }

    fn spinner(&self, message: String) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(self.style.clone());
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    pub(crate) fn clear(&self) {
        let _ = self.multi.clear();
    }
}

#[derive(Clone)]
pub struct LogWriter {
    multi: MultiProgress,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.multi.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.multi.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

fn is_dumb_term() -> bool {
    std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"))
}

pub async fn run_with_spinner<T>(
    progress: &ProgressState,
    stage: Stage,
    label: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    let bar = progress.spinner(stage.message(label));
    let result = fut.await;
    let outcome = match &result {
        Ok(_) => "done".bright_green().bold(),
        Err(_) => "failed".bright_red().bold(),
    };
    bar.finish_with_message(format!("{} {outcome}", stage.message(label)));
    result
}
