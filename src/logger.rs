//! Terminal output.
//!
//! `log!` prints a line tagged with the emitting module, `debug!` does the
//! same under `--verbose`. While serving, [`status`] keeps one rewritable
//! line at the bottom that always shows the outcome of the latest change.
//!
//! Everything goes to stderr; stdout belongs to `transform`.
//!
//! ```ignore
//! log!("serve"; "listening on {}", addr);
//! debug!("hmr"; "{}: {:?}", name, outcome);
//! status(Status::Failed, "failed: src/Counter.jsx\nUnexpected token");
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stderr},
    sync::atomic::{AtomicBool, Ordering},
    time::SystemTime,
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Height in lines of the status currently on screen, 0 once scrolled away.
static STATUS_HEIGHT: Mutex<usize> = Mutex::new(0);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// `log!` that prints only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Print `message` under a `[module]` tag.
///
/// The status line above it is left in place.
pub fn log(module: &str, message: &str) {
    let tag = tag(module);
    let mut height = STATUS_HEIGHT.lock();
    let mut err = stderr().lock();
    writeln!(err, "{tag} {message}").ok();
    err.flush().ok();
    *height = 0;
}

fn tag(module: &str) -> String {
    let tag = format!("[{module}]");
    match module {
        "serve" => tag.bright_blue().bold().to_string(),
        "watch" => tag.bright_green().bold().to_string(),
        "hmr" => tag.bright_magenta().bold().to_string(),
        "error" => tag.bright_red().bold().to_string(),
        _ => tag.bright_yellow().bold().to_string(),
    }
}

/// Outcome shown on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Updated,
    Unchanged,
    Reloading,
    Failed,
}

impl Status {
    fn render(self, message: &str) -> String {
        match self {
            Self::Updated => format!("{} {message}", "✓".green()),
            Self::Unchanged => message.dimmed().to_string(),
            Self::Reloading => format!("{} {message}", "⚠".yellow()),
            Self::Failed => format!("{} {message}", "✗".red()),
        }
    }
}

/// Replace the status line with `message`, which may span several lines.
pub fn status(kind: Status, message: &str) {
    let message = message.trim_end();
    let mut height = STATUS_HEIGHT.lock();
    let mut err = stderr().lock();

    if *height > 0 {
        let up = u16::try_from(*height).unwrap_or(u16::MAX);
        execute!(err, cursor::MoveUp(up), Clear(ClearType::FromCursorDown)).ok();
    }
    let stamp = format!("[{}]", clock()).dimmed().to_string();
    writeln!(err, "{stamp} {}", kind.render(message)).ok();
    err.flush().ok();

    *height = height_of(message);
}

/// Wall clock as `HH:MM:SS`, UTC.
fn clock() -> String {
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    format!("{:02}:{:02}:{:02}", secs / 3600 % 24, secs / 60 % 60, secs % 60)
}

fn height_of(message: &str) -> usize {
    message.lines().count().max(1)
}
