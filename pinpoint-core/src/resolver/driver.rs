//! Tokio task that drives a [`ResolverState`] from raw input.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{AbortHandle, JoinError, JoinSet};
use tokio::time::Instant;

use crate::{AddressResult, Debouncer, GeocodeError, Geocoder, ResolverError};

use super::{Completion, LookupTicket, RequestId, ResolverConfig, ResolverState, Settle, Snapshot};

type LookupOutcome = (RequestId, Result<Vec<AddressResult>, GeocodeError>);

#[derive(Debug)]
enum Command {
    Input(String),
    Refresh,
    Flush(oneshot::Sender<()>),
}

/// Debounced address lookup bound to one input.
///
/// The resolver owns its debounce timer, its lookup state and every lookup
/// in flight. Dropping it tears all of them down: pending input is
/// discarded, lookups in flight are aborted and never applied, and a final
/// idle state is published before subscriptions close.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use pinpoint_core::{Geocoder, Resolver, ResolverConfig};
///
/// # async fn demo(geocoder: Arc<dyn Geocoder>) -> Result<(), pinpoint_core::ResolverError> {
/// let resolver = Resolver::spawn(geocoder, ResolverConfig::default())?;
/// resolver.set_query("ber")?;
/// let settled = resolver.wait_for(|s| !s.settling && !s.loading).await?;
/// for result in &settled.results {
///     println!("{}", result.display_name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Resolver {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    config: ResolverConfig,
}

impl Resolver {
    /// Start a resolver on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error when `config` fails [`ResolverConfig::validate`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn<G>(geocoder: G, config: ResolverConfig) -> Result<Self, ResolverError>
    where
        G: Geocoder + 'static,
    {
        config.validate()?;
        let (commands, inbox) = mpsc::unbounded_channel();
        let (publisher, snapshots) = watch::channel(Snapshot::default());
        let driver = Driver {
            geocoder: Arc::new(geocoder),
            debouncer: Debouncer::new(config.debounce),
            state: ResolverState::new(config.min_query_chars),
            abort_superseded: config.abort_superseded,
            lookups: JoinSet::new(),
            in_flight: None,
            inbox,
            publisher,
        };
        // The task ends once every command sender is gone.
        tokio::spawn(driver.run());
        Ok(Self {
            commands,
            snapshots,
            config,
        })
    }

    /// Report a raw input change.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Closed`] if the resolver task has stopped.
    pub fn set_query(&self, query: impl Into<String>) -> Result<(), ResolverError> {
        self.send(Command::Input(query.into()))
    }

    /// Look the settled query up again.
    ///
    /// Does nothing until a qualifying query has settled.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Closed`] if the resolver task has stopped.
    pub fn refresh(&self) -> Result<(), ResolverError> {
        self.send(Command::Refresh)
    }

    /// Wait until every command sent before this call has been handled.
    ///
    /// The published state then reflects those commands, although a query
    /// may still be settling or loading.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Closed`] if the resolver task has stopped.
    pub async fn flush(&self) -> Result<(), ResolverError> {
        let (done, acknowledged) = oneshot::channel();
        self.send(Command::Flush(done))?;
        acknowledged.await.map_err(|_| ResolverError::Closed)
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified whenever the state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    ///
    /// The current state is checked first.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Closed`] if the resolver stops first.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<Snapshot, ResolverError>
    where
        F: FnMut(&Snapshot) -> bool,
    {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| ResolverError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Configuration the resolver was started with.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn send(&self, command: Command) -> Result<(), ResolverError> {
        self.commands
            .send(command)
            .map_err(|_| ResolverError::Closed)
    }
}

struct Driver {
    geocoder: Arc<dyn Geocoder>,
    debouncer: Debouncer<String>,
    state: ResolverState,
    abort_superseded: bool,
    lookups: JoinSet<LookupOutcome>,
    in_flight: Option<(RequestId, AbortHandle)>,
    inbox: mpsc::UnboundedReceiver<Command>,
    publisher: watch::Sender<Snapshot>,
}

impl Driver {
    async fn run(mut self) {
        loop {
            let deadline = self.debouncer.deadline();
            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                () = sleep_until(deadline) => self.flush_settled(),
                Some(joined) = self.lookups.join_next(), if !self.lookups.is_empty() => {
                    self.handle_joined(joined);
                }
            }
        }
        self.shutdown();
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Input(query) => {
                self.state.record_input(query.clone());
                self.debouncer.push(query, Instant::now());
            }
            Command::Refresh => {
                if let Some(ticket) = self.state.refresh() {
                    self.start_lookup(ticket);
                }
            }
            Command::Flush(done) => {
                if done.send(()).is_err() {
                    log::trace!("flush waiter went away");
                }
                return;
            }
        }
        self.publish();
    }

    fn flush_settled(&mut self) {
        let Some(settled) = self.debouncer.poll(Instant::now()) else {
            return;
        };
        log::trace!("query settled as {settled:?}");
        match self.state.settle(&settled) {
            Settle::Cleared { superseded } => {
                if superseded.is_some() {
                    self.release_in_flight();
                }
            }
            Settle::Unchanged => {}
            Settle::Fetch(ticket) => self.start_lookup(ticket),
        }
        self.publish();
    }

    fn start_lookup(&mut self, ticket: LookupTicket) {
        let LookupTicket {
            id,
            query,
            superseded,
        } = ticket;
        if let Some(previous) = superseded {
            log::debug!("lookup {previous} superseded by {id}");
            self.release_in_flight();
        }
        log::debug!("issuing lookup {id} for {query:?}");
        let geocoder = Arc::clone(&self.geocoder);
        let handle = self.lookups.spawn(async move {
            let outcome = geocoder.search(&query).await;
            (id, outcome)
        });
        self.in_flight = Some((id, handle));
    }

    fn release_in_flight(&mut self) {
        if let Some((_, handle)) = self.in_flight.take()
            && self.abort_superseded
        {
            handle.abort();
        }
    }

    fn handle_joined(&mut self, joined: Result<LookupOutcome, JoinError>) {
        let (id, outcome) = match joined {
            Ok(finished) => finished,
            Err(err) if err.is_cancelled() => return,
            Err(err) => match self.in_flight.as_ref() {
                Some((id, handle)) if handle.id() == err.id() => {
                    log::warn!("lookup {id} task failed: {err}");
                    let message = format!("lookup task failed: {err}");
                    (*id, Err(GeocodeError::Interrupted { message }))
                }
                _ => {
                    log::warn!("superseded lookup task failed: {err}");
                    return;
                }
            },
        };

        if let Err(err) = &outcome {
            log::warn!("lookup {id} failed: {err}");
        }
        match self.state.complete(id, outcome) {
            Completion::Applied => {
                log::debug!("applied lookup {id}");
                self.in_flight = None;
                self.publish();
            }
            Completion::Stale => log::debug!("discarded stale lookup {id}"),
        }
    }

    fn shutdown(&mut self) {
        self.debouncer.cancel();
        self.lookups.abort_all();
        if let Some(id) = self.state.cancel() {
            log::debug!("cancelled lookup {id} on shutdown");
        }
        self.publish();
    }

    fn publish(&self) {
        let next = self.state.snapshot();
        self.publisher.send_if_modified(|current| {
            if *current == *next {
                false
            } else {
                current.clone_from(next);
                true
            }
        });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
