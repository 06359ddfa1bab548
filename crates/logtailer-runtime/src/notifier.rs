use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::Stream;
use logtailer_types::{Notification, decode_aggregator_message};
use serde_json::Value;
use tokio::sync::mpsc;

/// Zero-or-one viewer slot.
///
/// Pushes travel in wire form (`{from: "aggregator", type: "NEW_LOG", ...}`).
/// Pushing with no viewer attached, or to a viewer that has gone away, is
/// the normal case and is silently dropped.
#[derive(Debug, Default)]
pub struct Notifier {
    viewer: Option<mpsc::UnboundedSender<Value>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a viewer, replacing any previous one.
    pub fn attach(&mut self) -> LiveLogs {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.viewer.replace(tx).is_some() {
            tracing::debug!("replacing attached viewer");
        }
        LiveLogs { receiver: rx }
    }

    pub fn is_attached(&self) -> bool {
        self.viewer.as_ref().is_some_and(|viewer| !viewer.is_closed())
    }

    /// Returns whether a viewer received the notification.
    pub fn notify(&mut self, notification: Notification) -> bool {
        let Some(viewer) = &self.viewer else {
            return false;
        };
        let message = match notification.to_message() {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode push");
                return false;
            }
        };
        if viewer.send(message).is_err() {
            self.viewer = None;
            return false;
        }
        true
    }
}

/// Push notifications for one attached viewer
#[derive(Debug)]
pub struct LiveLogs {
    receiver: mpsc::UnboundedReceiver<Value>,
}

impl LiveLogs {
    /// Poll for the next notification (non-blocking).
    ///
    /// Returns `None` if nothing is queued right now.
    pub fn try_next(&mut self) -> Option<Notification> {
        while let Ok(message) = self.receiver.try_recv() {
            if let Some(notification) = decode(message) {
                return Some(notification);
            }
        }
        None
    }

    /// Wait for the next notification; `None` once the aggregator has
    /// replaced this viewer or stopped.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            let message = self.receiver.recv().await?;
            if let Some(notification) = decode(message) {
                return Some(notification);
            }
        }
    }
}

impl Stream for LiveLogs {
    type Item = Notification;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let Some(message) = ready!(self.receiver.poll_recv(cx)) else {
                return Poll::Ready(None);
            };
            if let Some(notification) = decode(message) {
                return Poll::Ready(Some(notification));
            }
        }
    }
}

fn decode(message: Value) -> Option<Notification> {
    match decode_aggregator_message(message) {
        Ok(notification) => Some(notification),
        Err(err) => {
            tracing::warn!(error = %err, "skipping undecodable push");
            None
        }
    }
}
