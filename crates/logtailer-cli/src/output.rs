use is_terminal::IsTerminal;
use logtailer_types::{LogEntry, LogLevel};
use owo_colors::OwoColorize;
use serde::Serialize;

use logtailer_runtime::format_message;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn use_color() -> bool {
    std::io::stdout().is_terminal()
}

pub fn level_label(level: LogLevel, color: bool) -> String {
    let label = format!("{:<5}", level.as_str().to_uppercase());
    if !color {
        return label;
    }
    match level {
        LogLevel::Error => label.red().bold().to_string(),
        LogLevel::Warn => label.yellow().to_string(),
        LogLevel::Info => label.blue().to_string(),
        LogLevel::Debug => label.dimmed().to_string(),
        LogLevel::Log => label,
    }
}

/// `HH:MM:SS.mmm LEVEL message  (source)`
pub fn entry_line(entry: &LogEntry, color: bool) -> String {
    let mut line = format!(
        "{} {} {}",
        entry.timestamp.format("%H:%M:%S%.3f"),
        level_label(entry.level, color),
        format_message(&entry.message)
    );
    if let Some(source) = &entry.source {
        let source = format!("({})", source);
        line.push_str("  ");
        if color {
            line.push_str(&source.dimmed().to_string());
        } else {
            line.push_str(&source);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_plain_entry_line() {
        let entry = LogEntry::new(LogLevel::Warn, vec![json!("low disk"), json!(5)])
            .with_source("app.js:3:9")
            .with_timestamp(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());

        assert_eq!(entry_line(&entry, false), "03:04:05.000 WARN  low disk 5  (app.js:3:9)");
    }

    #[test]
    fn test_plain_label_is_padded() {
        assert_eq!(level_label(LogLevel::Log, false), "LOG  ");
        assert_eq!(level_label(LogLevel::Error, false), "ERROR");
    }
}
