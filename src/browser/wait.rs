use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent, RequestId,
};
use chromiumoxide::Page;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::time::{sleep, sleep_until, Instant};

use crate::error::{ExportError, Result};

/// Poll interval for the selector wait.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Quiet window the page must stay silent for before it counts as idle.
pub const NETWORK_IDLE_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// In-flight requests tolerated while idle, mirroring Chromium's
/// "networkidle2" heuristic for long-polling connections.
pub const NETWORK_IDLE_ALLOWANCE: usize = 2;

/// Outcome of a bounded element wait. The timeout case is an expected
/// result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorWait {
    Found,
    TimedOut,
}

/// Tracks requests that have started but not yet finished or failed.
#[derive(Debug)]
struct InflightRequests<K> {
    ids: HashSet<K>,
}

impl<K: Eq + Hash> InflightRequests<K> {
    fn new() -> Self {
        Self {
            ids: HashSet::new(),
        }
    }

    fn started(&mut self, id: K) {
        self.ids.insert(id);
    }

    fn settled(&mut self, id: &K) {
        self.ids.remove(id);
    }

    fn is_idle(&self, allowance: usize) -> bool {
        self.ids.len() <= allowance
    }
}

/// Subscribes to a page's network events so that requests triggered by a
/// subsequent content load are observed from the start.
pub struct NetworkIdleWatcher {
    started: BoxStream<'static, Arc<EventRequestWillBeSent>>,
    finished: BoxStream<'static, Arc<EventLoadingFinished>>,
    failed: BoxStream<'static, Arc<EventLoadingFailed>>,
    inflight: InflightRequests<RequestId>,
}

impl NetworkIdleWatcher {
    /// Attaches the listeners. Must be called before the navigation or
    /// content load whose requests should be counted.
    pub async fn attach(page: &Page) -> Result<Self> {
        let started = page.event_listener::<EventRequestWillBeSent>().await?;
        let finished = page.event_listener::<EventLoadingFinished>().await?;
        let failed = page.event_listener::<EventLoadingFailed>().await?;
        Ok(Self {
            started: started.boxed(),
            finished: finished.boxed(),
            failed: failed.boxed(),
            inflight: InflightRequests::new(),
        })
    }

    /// Suspends until no request has started for [`NETWORK_IDLE_QUIET_WINDOW`]
    /// and at most [`NETWORK_IDLE_ALLOWANCE`] requests remain in flight, or
    /// fails with [`ExportError::IdleTimeout`] once `limit` elapses.
    ///
    /// A closed event stream means the browser went away; the wait resolves
    /// and the next protocol call reports the real failure.
    pub async fn wait_until_idle(mut self, limit: Duration) -> Result<()> {
        let deadline = Instant::now() + limit;
        loop {
            let idle = self.inflight.is_idle(NETWORK_IDLE_ALLOWANCE);
            tokio::select! {
                _ = sleep_until(deadline) => return Err(ExportError::IdleTimeout(limit)),
                _ = sleep(NETWORK_IDLE_QUIET_WINDOW), if idle => return Ok(()),
                event = self.started.next() => match event {
                    Some(event) => self.inflight.started(event.request_id.clone()),
                    None => return Ok(()),
                },
                event = self.finished.next() => match event {
                    Some(event) => self.inflight.settled(&event.request_id),
                    None => return Ok(()),
                },
                event = self.failed.next() => match event {
                    Some(event) => self.inflight.settled(&event.request_id),
                    None => return Ok(()),
                },
            }
        }
    }
}

/// Polls for an element matching `selector` until it appears or `limit`
/// elapses. A miss surfaces from DOM.querySelector as an error, so protocol
/// errors during the poll are treated as "not present yet" and the bounded
/// deadline has the final word.
pub async fn wait_for_selector(
    page: &Page,
    selector: &str,
    limit: Duration,
) -> Result<SelectorWait> {
    let deadline = Instant::now() + limit;
    loop {
        if page.find_element(selector).await.is_ok() {
            return Ok(SelectorWait::Found);
        }
        if Instant::now() + DEFAULT_POLL_INTERVAL >= deadline {
            return Ok(SelectorWait::TimedOut);
        }
        sleep(DEFAULT_POLL_INTERVAL).await;
    }
}
