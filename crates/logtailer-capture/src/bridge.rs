use logtailer_types::PageMessage;
use serde::Deserialize;
use serde_json::Value;

use crate::Result;
use crate::window::{Window, WindowId, WindowMessage};

const LOG_CAPTURED: &str = "LOG_CAPTURED";

/// Privileged side of the relay (the extension runtime's messaging primitive).
///
/// Messages travel in wire form, exactly as the page posted them.
pub trait RuntimePort {
    fn send_message(&self, message: Value) -> Result<()>;
}

impl<F> RuntimePort for F
where
    F: Fn(Value) -> Result<()>,
{
    fn send_message(&self, message: Value) -> Result<()> {
        self(message)
    }
}

/// What the bridge did with one window message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relay {
    Forwarded,
    /// Posted by some other context; never forwarded
    ForeignSource,
    /// Not a log record (ordinary page traffic)
    NotALogRecord,
    /// Tagged as a log record but not shaped like one
    Malformed,
    PortClosed,
}

/// Stateless forwarder from a page window to the runtime.
///
/// Only messages whose source is the bridge's own window are considered, so a
/// script in another frame cannot inject aggregator messages. One accepted
/// inbound message yields exactly one outbound send.
#[derive(Debug)]
pub struct RelayBridge<P> {
    window_id: WindowId,
    port: P,
}

impl<P: RuntimePort> RelayBridge<P> {
    pub fn new(window_id: WindowId, port: P) -> Self {
        Self { window_id, port }
    }

    /// Register a bridge for `port` as a listener on `window`.
    pub fn attach(window: &Window, port: P)
    where
        P: 'static,
    {
        let bridge = Self::new(window.id(), port);
        window.add_listener(move |message| {
            bridge.relay(message);
        });
    }

    pub fn relay(&self, message: &WindowMessage) -> Relay {
        if message.source != self.window_id {
            tracing::debug!(source = %message.source, "ignoring message from foreign context");
            return Relay::ForeignSource;
        }

        if message.data.get("type").and_then(|t| t.as_str()) != Some(LOG_CAPTURED) {
            return Relay::NotALogRecord;
        }

        if let Err(err) = PageMessage::deserialize(&message.data) {
            tracing::debug!(error = %err, "ignoring malformed log record");
            return Relay::Malformed;
        }

        match self.port.send_message(message.data.clone()) {
            Ok(()) => Relay::Forwarded,
            Err(err) => {
                tracing::debug!(error = %err, "runtime port unavailable");
                Relay::PortClosed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use logtailer_types::{LogEntry, LogLevel};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn log_record() -> Value {
        let entry = LogEntry::new(LogLevel::Info, vec![json!("ready")]);
        serde_json::to_value(PageMessage::LogCaptured(entry)).unwrap()
    }

    fn recording_port() -> (impl Fn(Value) -> Result<()>, Rc<RefCell<Vec<Value>>>) {
        let sent = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sent);
        let port = move |message: Value| -> Result<()> {
            sink.borrow_mut().push(message);
            Ok(())
        };
        (port, sent)
    }

    #[test]
    fn test_forwards_own_log_records_verbatim() {
        let (port, sent) = recording_port();
        let bridge = RelayBridge::new(WindowId(5), port);
        let data = log_record();

        let outcome = bridge.relay(&WindowMessage {
            source: WindowId(5),
            data: data.clone(),
        });

        assert_eq!(outcome, Relay::Forwarded);
        let sent = sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], data);
    }

    #[test]
    fn test_forwards_extra_fields_untouched() {
        let (port, sent) = recording_port();
        let bridge = RelayBridge::new(WindowId(5), port);
        let mut data = log_record();
        data["payload"]["frameUrl"] = json!("https://shop.example/checkout");
        data["traceId"] = json!("c0ffee");

        let outcome = bridge.relay(&WindowMessage {
            source: WindowId(5),
            data: data.clone(),
        });

        assert_eq!(outcome, Relay::Forwarded);
        assert_eq!(sent.borrow().as_slice(), &[data]);
    }

    #[test]
    fn test_rejects_foreign_source() {
        let (port, sent) = recording_port();
        let bridge = RelayBridge::new(WindowId(5), port);

        let outcome = bridge.relay(&WindowMessage {
            source: WindowId(6),
            data: log_record(),
        });

        assert_eq!(outcome, Relay::ForeignSource);
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn test_ignores_other_traffic_and_malformed_records() {
        let (port, sent) = recording_port();
        let bridge = RelayBridge::new(WindowId(5), port);

        let other = bridge.relay(&WindowMessage {
            source: WindowId(5),
            data: json!({ "type": "ROUTE_CHANGED" }),
        });
        let malformed = bridge.relay(&WindowMessage {
            source: WindowId(5),
            data: json!({ "type": "LOG_CAPTURED", "payload": { "level": "shout" } }),
        });

        assert_eq!(other, Relay::NotALogRecord);
        assert_eq!(malformed, Relay::Malformed);
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn test_reports_closed_port() {
        let bridge = RelayBridge::new(WindowId(1), |_: Value| -> Result<()> {
            Err(Error::PortClosed)
        });
        let outcome = bridge.relay(&WindowMessage {
            source: WindowId(1),
            data: log_record(),
        });
        assert_eq!(outcome, Relay::PortClosed);
    }

    #[test]
    fn test_attach_listens_on_window() {
        let (port, sent) = recording_port();
        let window = Window::new(WindowId(3));
        RelayBridge::attach(&window, port);

        window.post_message(log_record());
        window.post_from(WindowId(4), log_record());

        assert_eq!(sent.borrow().len(), 1);
    }
}
