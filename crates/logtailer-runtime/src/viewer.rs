use logtailer_types::{Ack, LogSnapshot, TabId, ViewerRequest, ViewerResponse};

use crate::aggregator::AggregatorHandle;
use crate::notifier::LiveLogs;
use crate::{Error, Result};

/// A connected viewer: point-in-time queries plus the live push stream
#[derive(Debug)]
pub struct ViewerClient {
    handle: AggregatorHandle,
    live: LiveLogs,
}

impl ViewerClient {
    pub(crate) fn new(handle: AggregatorHandle, live: LiveLogs) -> Self {
        Self { handle, live }
    }

    pub async fn get_initial_data(&self) -> Result<LogSnapshot> {
        match self.handle.request(ViewerRequest::GetInitialData).await? {
            ViewerResponse::Snapshot(snapshot) => Ok(snapshot),
            ViewerResponse::Ack(ack) => Err(rejected(ack)),
        }
    }

    pub async fn clear_tab(&self, tab_id: TabId) -> Result<Ack> {
        self.acknowledged(ViewerRequest::clear_tab(tab_id)).await
    }

    pub async fn clear_all(&self) -> Result<Ack> {
        self.acknowledged(ViewerRequest::ClearAllLogs).await
    }

    pub fn live(&mut self) -> &mut LiveLogs {
        &mut self.live
    }

    pub fn into_live(self) -> LiveLogs {
        self.live
    }

    /// `Ok` carries both successful and failed acks; only transport and
    /// shape problems are errors.
    async fn acknowledged(&self, request: ViewerRequest) -> Result<Ack> {
        match self.handle.request(request).await? {
            ViewerResponse::Ack(ack) => Ok(ack),
            ViewerResponse::Snapshot(_) => Err(Error::UnexpectedResponse(
                "snapshot in reply to a clear request".to_string(),
            )),
        }
    }
}

fn rejected(ack: Ack) -> Error {
    Error::Rejected(ack.error.unwrap_or_else(|| "no reason given".to_string()))
}
