//! Node runtime: the registry, and the thread that sweeps it.
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time;

use crossbeam_channel as chan;
use serde::Serialize;
use serde_json as json;
use thiserror::Error;

use topology::registry::{self, Rejection};
use topology::store::Store;
use topology::{Announcement, Registration, Registry, Timestamp};

/// A runtime error.
#[derive(Error, Debug)]
pub enum Error {
    /// A registry error.
    #[error("registry error: {0}")]
    Registry(#[from] registry::Error),
    /// An I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// A response couldn't be encoded.
    #[error("failed to encode response: {0}")]
    Json(#[from] json::Error),
    /// The sweeper thread panicked.
    #[error("sweeper thread panicked")]
    Sweeper,
}

/// Reply to a heartbeat, written as one line of JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Owner of the announcement, if it could be decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Legacy status code, see [`Registration::status_code`].
    pub status: i64,
    /// Backoff granted to the peer, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_interval: Option<u64>,
    /// Why the heartbeat wasn't registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    fn registration(owner: &str, registration: &Registration) -> Self {
        let error = match registration {
            Registration::Rejected(Rejection::Invalid) => Some("invalid announcement".to_owned()),
            Registration::Rejected(Rejection::DuplicateMembership { claimed_by, .. }) => {
                Some(format!("already announced by {claimed_by}"))
            }
            Registration::Registered | Registration::Refreshed { .. } => None,
        };
        let backoff_interval = match registration {
            Registration::Refreshed { backoff } => Some(*backoff),
            _ => None,
        };
        Self {
            owner_id: Some(owner.to_owned()),
            status: registration.status_code(),
            backoff_interval,
            error,
        }
    }

    fn error(owner: Option<&str>, err: impl ToString) -> Self {
        Self {
            owner_id: owner.map(str::to_owned),
            status: -1,
            backoff_interval: None,
            error: Some(err.to_string()),
        }
    }
}

/// Holds the registry, and the sweeper thread expiring its announcements.
pub struct Runtime<S> {
    pub registry: Arc<Registry<S>>,
    sweeper: thread::JoinHandle<()>,
    shutdown: chan::Sender<()>,
}

impl<S> Runtime<S>
where
    S: Store + Send + 'static,
{
    /// Initialize the runtime.
    ///
    /// This function spawns the sweeper thread, which checks for expired
    /// announcements every `sweep_interval`.
    pub fn init(registry: Registry<S>, sweep_interval: time::Duration) -> Result<Self, Error> {
        let registry = Arc::new(registry);
        let (shutdown, stop) = chan::bounded(1);
        let sweeper = thread::Builder::new().name("sweeper".to_owned()).spawn({
            let registry = registry.clone();
            move || sweep(&registry, sweep_interval, stop)
        })?;

        log::info!(
            target: "node",
            "Sweeping announcements of {} every {}ms",
            registry.local_instance(),
            sweep_interval.as_millis()
        );

        Ok(Self {
            registry,
            sweeper,
            shutdown,
        })
    }

    /// Register the announcement carried by one heartbeat line.
    pub fn heartbeat(&self, line: &str, now: Timestamp) -> Response {
        let announcement = match Announcement::from_json(line) {
            Ok(a) => a,
            Err(e) => {
                log::debug!(target: "node", "Ignoring malformed heartbeat: {e}");
                return Response::error(None, e);
            }
        };
        let owner = announcement.owner_id().to_owned();

        match self.registry.register_announcement(announcement, now) {
            Ok(registration) => Response::registration(&owner, &registration),
            Err(e) => {
                log::error!(target: "node", "Failed to register announcement of {owner}: {e}");
                Response::error(Some(&owner), e)
            }
        }
    }

    /// Answer heartbeats read from `input`, one per line, until it is
    /// exhausted. Empty lines are skipped.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<(), Error> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let response = self.heartbeat(&line, Timestamp::now());

            json::to_writer(&mut output, &response)?;
            writeln!(output)?;
            output.flush()?;
        }
        Ok(())
    }

    /// Stop the sweeper and wait for it to finish.
    pub fn shutdown(self) -> Result<(), Error> {
        // The sweeper may already be gone, in which case there is nothing to stop.
        let _ = self.shutdown.send(());
        self.sweeper.join().map_err(|_| Error::Sweeper)
    }
}

fn sweep<S: Store>(registry: &Registry<S>, interval: time::Duration, stop: chan::Receiver<()>) {
    let ticker = chan::tick(interval);

    loop {
        chan::select! {
            recv(ticker) -> _ => {
                match registry.check_expired_announcements(Timestamp::now()) {
                    Ok(expired) if !expired.is_empty() => {
                        log::info!(target: "node", "Expired {} announcement(s)", expired.len());
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::error!(target: "node", "Failed to check expired announcements: {e}");
                    }
                }
            }
            recv(stop) -> _ => {
                log::debug!(target: "node", "Sweeper shutting down..");
                break;
            }
        }
    }
}
