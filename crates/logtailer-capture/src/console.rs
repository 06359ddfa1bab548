use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Write;
use std::panic::Location;
use std::rc::Rc;

use logtailer_types::LogLevel;

use crate::serialize::serialize_args;
use crate::value::Value;

/// Call site of a console call
pub type CallSite = &'static Location<'static>;

/// A replaceable console entry point
pub type ConsoleMethod = Rc<dyn Fn(&[Value], CallSite)>;

/// Where the default console methods write to
pub trait ConsoleOutput {
    fn write(&self, level: LogLevel, args: &[Value]);
}

/// A page's console bindings.
///
/// Each level is a method slot that page code calls through and that an
/// interceptor can swap out and later restore.
pub struct Console {
    methods: RefCell<HashMap<LogLevel, ConsoleMethod>>,
    intercepted: Cell<bool>,
}

impl Console {
    pub fn new(output: Rc<dyn ConsoleOutput>) -> Rc<Self> {
        let methods = LogLevel::ALL
            .into_iter()
            .map(|level| {
                let output = Rc::clone(&output);
                let method: ConsoleMethod =
                    Rc::new(move |args: &[Value], _: CallSite| output.write(level, args));
                (level, method)
            })
            .collect();

        Rc::new(Self {
            methods: RefCell::new(methods),
            intercepted: Cell::new(false),
        })
    }

    #[track_caller]
    pub fn log(&self, args: &[Value]) {
        self.call(LogLevel::Log, args);
    }

    #[track_caller]
    pub fn info(&self, args: &[Value]) {
        self.call(LogLevel::Info, args);
    }

    #[track_caller]
    pub fn warn(&self, args: &[Value]) {
        self.call(LogLevel::Warn, args);
    }

    #[track_caller]
    pub fn error(&self, args: &[Value]) {
        self.call(LogLevel::Error, args);
    }

    #[track_caller]
    pub fn debug(&self, args: &[Value]) {
        self.call(LogLevel::Debug, args);
    }

    #[track_caller]
    pub fn call(&self, level: LogLevel, args: &[Value]) {
        let site = Location::caller();
        // Clone out of the slot so a method may itself swap slots.
        if let Some(method) = self.method(level) {
            method(args, site);
        }
    }

    pub fn method(&self, level: LogLevel) -> Option<ConsoleMethod> {
        self.methods.borrow().get(&level).cloned()
    }

    /// Swap the method for `level`, returning the previous one.
    pub fn replace(&self, level: LogLevel, method: ConsoleMethod) -> Option<ConsoleMethod> {
        self.methods.borrow_mut().insert(level, method)
    }

    pub(crate) fn mark_intercepted(&self, intercepted: bool) -> bool {
        self.intercepted.replace(intercepted)
    }

    pub fn is_intercepted(&self) -> bool {
        self.intercepted.get()
    }
}

/// Writes console output to stderr, one line per call
#[derive(Debug, Default)]
pub struct StderrOutput;

impl ConsoleOutput for StderrOutput {
    fn write(&self, level: LogLevel, args: &[Value]) {
        let line = render_line(args);
        let _ = writeln!(std::io::stderr(), "[console.{}] {}", level, line);
    }
}

/// Keeps every call in memory
#[derive(Debug, Default)]
pub struct RecordingOutput {
    lines: RefCell<Vec<(LogLevel, String)>>,
}

impl RecordingOutput {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.borrow().clone()
    }
}

impl ConsoleOutput for RecordingOutput {
    fn write(&self, level: LogLevel, args: &[Value]) {
        self.lines.borrow_mut().push((level, render_line(args)));
    }
}

fn render_line(args: &[Value]) -> String {
    serialize_args(args)
        .iter()
        .map(|arg| match arg {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_methods_write_to_output() {
        let output = RecordingOutput::new();
        let console = Console::new(output.clone());

        console.log(&[Value::from("hello"), Value::from(2)]);
        console.error(&[Value::object([("code", Value::from(500))])]);

        assert_eq!(
            output.lines(),
            vec![
                (LogLevel::Log, "hello 2".to_string()),
                (LogLevel::Error, "{\"code\":500}".to_string()),
            ]
        );
    }

    #[test]
    fn test_call_site_points_at_caller() {
        let output = RecordingOutput::new();
        let console = Console::new(output);
        let seen = Rc::new(Cell::new(0u32));

        let seen_in_method = Rc::clone(&seen);
        console.replace(
            LogLevel::Info,
            Rc::new(move |_: &[Value], site: CallSite| seen_in_method.set(site.line())),
        );

        let expected = line!() + 1;
        console.info(&[]);

        assert_eq!(seen.get(), expected);
    }

    #[test]
    fn test_replace_returns_previous_method() {
        let output = RecordingOutput::new();
        let console = Console::new(output.clone());

        let previous = console
            .replace(LogLevel::Warn, Rc::new(|_: &[Value], _: CallSite| {}))
            .unwrap();
        console.warn(&[Value::from("swallowed")]);
        assert!(output.lines().is_empty());

        console.replace(LogLevel::Warn, previous);
        console.warn(&[Value::from("visible")]);
        assert_eq!(output.lines(), vec![(LogLevel::Warn, "visible".to_string())]);
    }
}
