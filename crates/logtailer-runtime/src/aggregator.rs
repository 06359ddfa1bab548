//! The aggregator: privileged, long-lived owner of the log store.
//!
//! Commands are handled strictly one at a time, each to completion
//! (storage writes included) before the next is taken off the queue. Page
//! relays, viewers and tab lifecycle events all feed the same FIFO queue,
//! so a viewer query always observes every record relayed before it.

use logtailer_capture::RuntimePort;
use logtailer_store::{LogStore, Storage};
use logtailer_types::{
    Ack, LogSnapshot, NewLog, Notification, PageMessage, TabId, ViewerRequest, ViewerResponse,
    decode_viewer_message,
};
use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot};

use crate::notifier::{LiveLogs, Notifier};
use crate::tabs::TabDirectory;
use crate::viewer::ViewerClient;
use crate::{Error, Result};

pub struct Aggregator<S, D> {
    store: LogStore<S>,
    tabs: D,
    notifier: Notifier,
}

impl<S, D> Aggregator<S, D>
where
    S: Storage,
    D: TabDirectory,
{
    pub fn new(store: LogStore<S>, tabs: D) -> Self {
        Self {
            store,
            tabs,
            notifier: Notifier::new(),
        }
    }

    pub fn store(&self) -> &LogStore<S> {
        &self.store
    }

    pub fn attach_viewer(&mut self) -> LiveLogs {
        self.notifier.attach()
    }

    /// A message relayed from the page in `tab_id`.
    pub async fn handle_runtime_message(&mut self, tab_id: TabId, message: PageMessage) -> Result<()> {
        match message {
            PageMessage::LogCaptured(entry) => {
                let tab_info = self.tabs.tab_info(tab_id);
                self.store.record_log(entry.clone(), tab_info.clone()).await?;

                let delivered = self.notifier.notify(Notification::NewLog(NewLog {
                    tab_id,
                    log_entry: entry,
                    tab_info,
                }));
                tracing::trace!(tab = %tab_id, delivered, "log recorded");
            }
        }
        Ok(())
    }

    pub async fn handle_viewer_request(&self, request: ViewerRequest) -> ViewerResponse {
        match request {
            ViewerRequest::GetInitialData => match self.store.get_all().await {
                Ok(snapshot) => snapshot.into(),
                Err(err) => storage_failure(err),
            },
            ViewerRequest::ClearTabLogs(tab) => match self.store.clear_tab(tab.tab_id).await {
                Ok(true) => Ack::tab_cleared(tab.tab_id).into(),
                Ok(false) => Ack::tab_not_found(tab.tab_id).into(),
                Err(err) => storage_failure(err),
            },
            ViewerRequest::ClearAllLogs => match self.store.clear_all().await {
                Ok(()) => Ack::ok().into(),
                Err(err) => storage_failure(err),
            },
        }
    }

    /// Answer a viewer message in wire form.
    ///
    /// Messages that are not from a viewer get no response at all.
    pub async fn respond_raw(&self, message: Value) -> Option<Value> {
        let response = match decode_viewer_message(message) {
            Ok(request) => self.handle_viewer_request(request).await,
            Err(logtailer_types::Error::UnexpectedSender(from)) => {
                tracing::debug!(%from, "ignoring message not addressed by a viewer");
                return None;
            }
            Err(err) => Ack::failed(err.to_string()).into(),
        };
        Some(encode_response(&response))
    }

    /// Forget a closed tab.
    pub async fn handle_tab_removed(&self, tab_id: TabId) -> Result<()> {
        self.store.remove_tab(tab_id).await?;
        Ok(())
    }

    pub async fn snapshot(&self) -> Result<LogSnapshot> {
        Ok(self.store.get_all().await?)
    }
}

impl<S, D> Aggregator<S, D>
where
    S: Storage + 'static,
    D: TabDirectory + 'static,
{
    /// Run the aggregator loop on a tokio task.
    ///
    /// The loop ends once every handle and tab port has been dropped.
    pub fn spawn(self) -> AggregatorHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(self.run(rx));
        AggregatorHandle { commands: tx }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::debug!("aggregator started");
        while let Some(command) = commands.recv().await {
            self.dispatch(command).await;
        }
        tracing::debug!("aggregator stopped");
    }

    async fn dispatch(&mut self, command: Command) {
        match command {
            Command::Runtime { tab_id, message } => {
                let message: PageMessage = match serde_json::from_value(message) {
                    Ok(message) => message,
                    Err(err) => {
                        tracing::warn!(tab = %tab_id, error = %err, "dropping undecodable page message");
                        return;
                    }
                };
                if let Err(err) = self.handle_runtime_message(tab_id, message).await {
                    tracing::warn!(tab = %tab_id, error = %err, "failed to record log");
                }
            }
            Command::Viewer { message, reply } => {
                let response = self.respond_raw(message).await;
                let _ = reply.send(response);
            }
            Command::TabRemoved(tab_id) => {
                if let Err(err) = self.handle_tab_removed(tab_id).await {
                    tracing::warn!(tab = %tab_id, error = %err, "failed to clean up closed tab");
                }
            }
            Command::AttachViewer(reply) => {
                let _ = reply.send(self.attach_viewer());
            }
            Command::Flush(reply) => {
                let _ = reply.send(());
            }
        }
    }
}

fn storage_failure(err: logtailer_store::Error) -> ViewerResponse {
    tracing::warn!(error = %err, "storage failure while answering viewer");
    Ack::failed(err.to_string()).into()
}

fn encode_response(response: &ViewerResponse) -> Value {
    serde_json::to_value(response)
        .unwrap_or_else(|err| json!({ "success": false, "error": err.to_string() }))
}

enum Command {
    Runtime {
        tab_id: TabId,
        message: Value,
    },
    Viewer {
        message: Value,
        reply: oneshot::Sender<Option<Value>>,
    },
    TabRemoved(TabId),
    AttachViewer(oneshot::Sender<LiveLogs>),
    Flush(oneshot::Sender<()>),
}

/// Cloneable handle onto a running aggregator
#[derive(Debug, Clone)]
pub struct AggregatorHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl AggregatorHandle {
    /// The runtime port pages in `tab_id` relay through.
    pub fn tab_port(&self, tab_id: TabId) -> TabPort {
        TabPort {
            tab_id,
            commands: self.commands.clone(),
        }
    }

    /// Send a wire-form viewer message and wait for the wire-form answer.
    pub async fn request_raw(&self, message: Value) -> Result<Option<Value>> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Viewer { message, reply })?;
        response.await.map_err(|_| Error::AggregatorStopped)
    }

    pub async fn request(&self, request: ViewerRequest) -> Result<ViewerResponse> {
        let response = self
            .request_raw(request.to_message()?)
            .await?
            .ok_or_else(|| Error::UnexpectedResponse("no response to viewer request".to_string()))?;
        Ok(ViewerResponse::decode(&request, response)?)
    }

    pub fn tab_removed(&self, tab_id: TabId) -> Result<()> {
        self.send(Command::TabRemoved(tab_id))
    }

    pub async fn connect_viewer(&self) -> Result<ViewerClient> {
        let (reply, live) = oneshot::channel();
        self.send(Command::AttachViewer(reply))?;
        let live = live.await.map_err(|_| Error::AggregatorStopped)?;
        Ok(ViewerClient::new(self.clone(), live))
    }

    /// Wait until every command sent before this call has been handled.
    pub async fn flush(&self) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.send(Command::Flush(reply))?;
        done.await.map_err(|_| Error::AggregatorStopped)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| Error::AggregatorStopped)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Runtime { tab_id, .. } => write!(f, "Runtime({})", tab_id),
            Command::Viewer { .. } => write!(f, "Viewer"),
            Command::TabRemoved(tab_id) => write!(f, "TabRemoved({})", tab_id),
            Command::AttachViewer(_) => write!(f, "AttachViewer"),
            Command::Flush(_) => write!(f, "Flush"),
        }
    }
}

/// Runtime end of one tab's relay bridge
#[derive(Debug, Clone)]
pub struct TabPort {
    tab_id: TabId,
    commands: mpsc::UnboundedSender<Command>,
}

impl TabPort {
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }
}

impl RuntimePort for TabPort {
    fn send_message(&self, message: Value) -> logtailer_capture::Result<()> {
        self.commands
            .send(Command::Runtime {
                tab_id: self.tab_id,
                message,
            })
            .map_err(|_| logtailer_capture::Error::PortClosed)
    }
}
