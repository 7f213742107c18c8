//! User-facing messages on stderr.
//!
//! [`Output`] is the handle commands print through and the
//! [`Reporter`] the core reports download progress to. Progress lines are
//! redrawn in place only when stderr is a terminal.

use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::cursor::MoveToColumn;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use super::progress::format_download_progress;
use super::theme::{Theme, format_size};
use kvm_core::Reporter;
use kvm_schema::{KubeVersion, Platform};

/// No progress line has been drawn yet.
const NOT_DRAWN: u64 = u64::MAX;

/// A cloneable handle for terminal messages.
#[derive(Debug, Clone)]
pub struct Output {
    theme: Theme,
    quiet: bool,
    interactive: bool,
    last_percent: Arc<AtomicU64>,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self {
            theme: Theme::default(),
            quiet,
            interactive: std::io::stderr().is_terminal(),
            last_percent: Arc::new(AtomicU64::new(NOT_DRAWN)),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet {
            self.line(&format!("{} {msg}", self.theme.icons.info.dark_grey()));
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            self.line(&format!(
                "{} {msg}",
                self.theme.icons.success.with(self.theme.colors.success)
            ));
        }
    }

    pub fn warning(&self, msg: &str) {
        self.line(&format!(
            "{} {msg}",
            self.theme.icons.warning.with(self.theme.colors.warning)
        ));
    }

    pub fn error(&self, msg: &str) {
        self.line(&format!(
            "{} {msg}",
            self.theme.icons.error.with(self.theme.colors.error)
        ));
    }

    fn version_cell(&self, version: &KubeVersion) -> String {
        let cell = format!(
            "{: <width$}",
            version.to_string(),
            width = self.theme.layout.version_width
        );
        cell.with(self.theme.colors.version).to_string()
    }

    /// Print a full line, first clearing any progress line in place.
    fn line(&self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        if self.interactive && self.last_percent.swap(NOT_DRAWN, Ordering::Relaxed) != NOT_DRAWN {
            let _ = queue!(stderr, MoveToColumn(0), Clear(ClearType::CurrentLine));
        }
        let _ = writeln!(stderr, "{text}");
        let _ = stderr.flush();
    }

    /// Redraw the progress line in place.
    fn redraw(&self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = queue!(
            stderr,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(text)
        );
        let _ = stderr.flush();
    }
}

impl Reporter for Output {
    fn downloading(&self, version: &KubeVersion, current: u64, total: Option<u64>) {
        if self.quiet || !self.interactive {
            return;
        }
        let percent = match total {
            Some(total) if total > 0 => current.saturating_mul(100) / total,
            // Without a total, redraw once per mebibyte.
            _ => current >> 20,
        };
        if self.last_percent.swap(percent, Ordering::Relaxed) == percent {
            return;
        }

        let progress =
            format_download_progress(current, total, self.theme.layout.bar_width);
        self.redraw(&format!(
            "  {} {} {}",
            self.theme.icons.active.with(self.theme.colors.version),
            self.version_cell(version),
            progress.dark_grey()
        ));
    }

    fn verifying(&self, version: &KubeVersion, platform: Platform) {
        if self.quiet || !self.interactive {
            return;
        }
        self.last_percent.store(0, Ordering::Relaxed);
        self.redraw(&format!(
            "  {} {} {}",
            self.theme.icons.active.with(self.theme.colors.version),
            self.version_cell(version),
            format!("verifying {platform}").dark_grey()
        ));
    }

    fn done(&self, version: &KubeVersion, detail: &str, size: Option<u64>) {
        if self.quiet {
            return;
        }
        let size = size.map(format_size).unwrap_or_default();
        self.line(&format!(
            "  {} {} {: <12} {}",
            self.theme.icons.success.with(self.theme.colors.success),
            self.version_cell(version),
            detail,
            size.dark_grey()
        ));
    }

    fn failed(&self, version: &KubeVersion, reason: &str) {
        self.line(&format!(
            "  {} {} {}",
            self.theme.icons.error.with(self.theme.colors.error),
            self.version_cell(version),
            reason.with(self.theme.colors.error)
        ));
    }

    fn info(&self, msg: &str) {
        Output::info(self, msg);
    }

    fn success(&self, msg: &str) {
        Output::success(self, msg);
    }

    fn warning(&self, msg: &str) {
        Output::warning(self, msg);
    }
}
