use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identity of a browsing context (a page's top-level window or a frame)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// A message delivered to a window's listeners
#[derive(Debug, Clone, PartialEq)]
pub struct WindowMessage {
    pub source: WindowId,
    pub data: serde_json::Value,
}

type Listener = Rc<dyn Fn(&WindowMessage)>;

/// Same-process message channel of one window.
///
/// Posting is fire-and-forget: every registered listener sees the message,
/// nothing is acknowledged and nothing is queued.
#[derive(Clone)]
pub struct Window {
    inner: Rc<WindowInner>,
}

struct WindowInner {
    id: WindowId,
    listeners: RefCell<Vec<Listener>>,
}

impl Window {
    pub fn new(id: WindowId) -> Self {
        Self {
            inner: Rc::new(WindowInner {
                id,
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> WindowId {
        self.inner.id
    }

    pub fn add_listener(&self, listener: impl Fn(&WindowMessage) + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Post a message from this window to itself.
    pub fn post_message(&self, data: serde_json::Value) {
        self.post_from(self.id(), data);
    }

    /// Deliver a message that another context (e.g. an embedded frame) posted
    /// to this window.
    pub fn post_from(&self, source: WindowId, data: serde_json::Value) {
        let message = WindowMessage { source, data };
        // Snapshot so listeners may post or register while being notified.
        let listeners: Vec<Listener> = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener(&message);
        }
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.inner.id)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listeners_receive_source_and_data() {
        let window = Window::new(WindowId(1));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        window.add_listener(move |message| sink.borrow_mut().push(message.clone()));

        window.post_message(json!({ "type": "ping" }));
        window.post_from(WindowId(2), json!("from a frame"));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].source, WindowId(1));
        assert_eq!(seen[1].source, WindowId(2));
        assert_eq!(seen[1].data, json!("from a frame"));
    }

    #[test]
    fn test_listener_may_post_reentrantly() {
        let window = Window::new(WindowId(1));
        let count = Rc::new(RefCell::new(0));

        let echo = window.clone();
        let counter = Rc::clone(&count);
        window.add_listener(move |message| {
            *counter.borrow_mut() += 1;
            if message.data == json!("first") {
                echo.post_message(json!("second"));
            }
        });

        window.post_message(json!("first"));
        assert_eq!(*count.borrow(), 2);
    }
}
