//! Capture interceptor.
//!
//! Installed once per page load. Every intercepted entry point first runs the
//! method it replaced, so the page sees unchanged console behavior, and then
//! posts a [`PageMessage::LogCaptured`] to the page window. Capture problems
//! never reach page code.

use chrono::Utc;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use logtailer_types::{LogEntry, LogLevel, PageMessage};

use crate::console::{CallSite, Console, ConsoleMethod};
use crate::serialize::Serializer;
use crate::value::Value;
use crate::window::Window;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct Interceptor {
    levels: Vec<LogLevel>,
    serializer: Serializer,
}

impl Default for Interceptor {
    fn default() -> Self {
        Self {
            levels: LogLevel::ALL.to_vec(),
            serializer: Serializer::default(),
        }
    }
}

impl Interceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict interception to `levels`; other entry points stay untouched.
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = LogLevel>) -> Self {
        self.levels.clear();
        for level in levels {
            if !self.levels.contains(&level) {
                self.levels.push(level);
            }
        }
        self
    }

    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn levels(&self) -> &[LogLevel] {
        &self.levels
    }

    /// Replace the configured console methods with capturing wrappers.
    ///
    /// The returned guard restores the original methods when dropped.
    pub fn install(&self, console: &Rc<Console>, window: &Window) -> Result<InstalledInterceptor> {
        if console.mark_intercepted(true) {
            return Err(Error::AlreadyInstalled);
        }

        let mut originals = Vec::with_capacity(self.levels.len());
        for &level in &self.levels {
            let Some(original) = console.method(level) else {
                continue;
            };

            let serializer = self.serializer;
            let window = window.clone();
            let forward = Rc::clone(&original);
            let wrapper: ConsoleMethod = Rc::new(move |args: &[Value], site: CallSite| {
                forward(args, site);
                let captured = panic::catch_unwind(AssertUnwindSafe(|| {
                    capture(level, args, site, &serializer, &window)
                }));
                if captured.is_err() {
                    tracing::debug!(%level, "console capture failed");
                }
            });

            console.replace(level, wrapper);
            originals.push((level, original));
        }

        tracing::debug!(
            window = %window.id(),
            levels = originals.len(),
            "console interceptor installed"
        );

        Ok(InstalledInterceptor {
            console: Rc::clone(console),
            originals,
        })
    }
}

fn capture(
    level: LogLevel,
    args: &[Value],
    site: CallSite,
    serializer: &Serializer,
    window: &Window,
) {
    let entry = LogEntry {
        level,
        message: serializer.serialize(args),
        timestamp: Utc::now(),
        source: Some(format!("{}:{}:{}", site.file(), site.line(), site.column())),
    };

    match serde_json::to_value(PageMessage::LogCaptured(entry)) {
        Ok(data) => window.post_message(data),
        Err(err) => tracing::debug!(error = %err, "dropping unencodable log entry"),
    }
}

/// Scoped installation of an [`Interceptor`]
pub struct InstalledInterceptor {
    console: Rc<Console>,
    originals: Vec<(LogLevel, ConsoleMethod)>,
}

impl InstalledInterceptor {
    pub fn levels(&self) -> Vec<LogLevel> {
        self.originals.iter().map(|(level, _)| *level).collect()
    }

    /// Restore the original console methods.
    pub fn uninstall(self) {}
}

impl Drop for InstalledInterceptor {
    fn drop(&mut self) {
        for (level, original) in self.originals.drain(..) {
            self.console.replace(level, original);
        }
        self.console.mark_intercepted(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::RecordingOutput;
    use crate::window::{WindowId, WindowMessage};
    use serde_json::json;
    use std::cell::RefCell;

    fn capture_window() -> (Window, Rc<RefCell<Vec<WindowMessage>>>) {
        let window = Window::new(WindowId(1));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        window.add_listener(move |message| sink.borrow_mut().push(message.clone()));
        (window, seen)
    }

    fn captured_entries(seen: &RefCell<Vec<WindowMessage>>) -> Vec<LogEntry> {
        seen.borrow()
            .iter()
            .map(|message| match serde_json::from_value(message.data.clone()).unwrap() {
                PageMessage::LogCaptured(entry) => entry,
            })
            .collect()
    }

    #[test]
    fn test_original_runs_and_entry_is_posted() {
        let output = RecordingOutput::new();
        let console = Console::new(output.clone());
        let (window, seen) = capture_window();

        let _installed = Interceptor::new().install(&console, &window).unwrap();
        console.warn(&[Value::from("low disk"), Value::from(5)]);

        assert_eq!(output.lines(), vec![(LogLevel::Warn, "low disk 5".to_string())]);

        let entries = captured_entries(&seen);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(entries[0].message, vec![json!("low disk"), json!(5)]);
        assert_eq!(seen.borrow()[0].data["type"], "LOG_CAPTURED");
    }

    #[test]
    fn test_source_names_the_calling_line() {
        let console = Console::new(RecordingOutput::new());
        let (window, seen) = capture_window();
        let _installed = Interceptor::new().install(&console, &window).unwrap();

        let line = line!() + 1;
        console.log(&[Value::from("where am I")]);

        let source = captured_entries(&seen)[0].source.clone().unwrap();
        assert!(source.contains("interceptor.rs"), "source was {}", source);
        assert!(source.contains(&format!(":{}:", line)), "source was {}", source);
    }

    #[test]
    fn test_uninstall_restores_original_methods() {
        let output = RecordingOutput::new();
        let console = Console::new(output.clone());
        let (window, seen) = capture_window();

        let installed = Interceptor::new().install(&console, &window).unwrap();
        assert!(console.is_intercepted());
        installed.uninstall();
        assert!(!console.is_intercepted());

        console.error(&[Value::from("after teardown")]);
        assert!(seen.borrow().is_empty());
        assert_eq!(output.lines().len(), 1);
    }

    #[test]
    fn test_second_install_is_rejected() {
        let console = Console::new(RecordingOutput::new());
        let (window, _) = capture_window();

        let _installed = Interceptor::new().install(&console, &window).unwrap();
        let second = Interceptor::new().install(&console, &window);
        assert!(matches!(second, Err(Error::AlreadyInstalled)));
    }

    #[test]
    fn test_only_selected_levels_are_captured() {
        let console = Console::new(RecordingOutput::new());
        let (window, seen) = capture_window();

        let installed = Interceptor::new()
            .with_levels([LogLevel::Error, LogLevel::Error])
            .install(&console, &window)
            .unwrap();
        assert_eq!(installed.levels(), vec![LogLevel::Error]);

        console.log(&[Value::from("ignored")]);
        console.error(&[Value::from("kept")]);

        let entries = captured_entries(&seen);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Error);
    }

    #[test]
    fn test_circular_argument_does_not_disturb_page() {
        let output = RecordingOutput::new();
        let console = Console::new(output.clone());
        let (window, seen) = capture_window();
        let _installed = Interceptor::new().install(&console, &window).unwrap();

        let node = crate::value::ObjectRef::new();
        node.set("self", Value::Object(node.clone()));
        console.info(&[Value::Object(node)]);

        assert_eq!(output.lines().len(), 1);
        assert_eq!(captured_entries(&seen)[0].message, vec![json!({ "self": "[Circular]" })]);
    }
}
