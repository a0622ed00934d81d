//! Runs a [`Mailbox`] on a single tokio task.
//!
//! The task owns the state and handles one event at a time. Network effects
//! are spawned as independent tasks whose results come back through the same
//! queue, so the reducer never sees concurrent mutation.

use crate::{Client, Effect, Event, Mailbox, Settings, Signal};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// Shortest timer period; `tokio::time::interval` panics on zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Channels for driving a spawned [`Dispatcher`].
#[derive(Debug)]
pub struct DispatcherHandle {
    /// User intents. Dropping every sender stops the dispatcher.
    pub events: mpsc::UnboundedSender<Event>,
    pub signals: mpsc::UnboundedReceiver<Signal>,
    /// Snapshot published after every event.
    pub state: watch::Receiver<Mailbox>,
    /// Resolves to the final state once the loop exits.
    pub task: JoinHandle<Mailbox>,
}

/// Executes the effects of a [`Mailbox`] against a [`Client`].
pub struct Dispatcher {
    client: Arc<Client>,
    mailbox: Mailbox,
    completions: mpsc::UnboundedSender<Event>,
    signals: mpsc::UnboundedSender<Signal>,
    state: watch::Sender<Mailbox>,
}

impl Dispatcher {
    /// Open mailbox `name` and start processing events.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Examples
    /// ```no_run
    /// # use mailbox_view::{Client, Dispatcher, Event, Settings};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), mailbox_view::Error> {
    /// let client = Client::new()?;
    /// let mut handle = Dispatcher::spawn(client, "swaks", None, Settings::default());
    /// handle.events.send(Event::SearchInput("invoice".into())).ok();
    /// while let Some(signal) = handle.signals.recv().await {
    ///     println!("{signal:?}");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(
        client: Client,
        name: impl Into<String>,
        selection: Option<String>,
        settings: Settings,
    ) -> DispatcherHandle {
        let (mailbox, outcome) = Mailbox::init(name, selection, Utc::now(), settings);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(mailbox.clone());

        let dispatcher = Dispatcher {
            client: Arc::new(client),
            mailbox,
            completions: completions_tx,
            signals: signals_tx,
            state: state_tx,
        };

        let task = tokio::spawn(async move {
            dispatcher.apply(outcome.effects, outcome.signals);
            dispatcher.run(events_rx, completions_rx).await
        });

        DispatcherHandle {
            events: events_tx,
            signals: signals_rx,
            state: state_rx,
            task,
        }
    }

    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<Event>,
        mut completions: mpsc::UnboundedReceiver<Event>,
    ) -> Mailbox {
        let Settings {
            seen_probe_interval,
            clock_interval,
            ..
        } = self.mailbox.settings;
        let seen_probe_interval = seen_probe_interval.max(MIN_INTERVAL);
        let clock_interval = clock_interval.max(MIN_INTERVAL);

        let mut clock = time::interval_at(time::Instant::now() + clock_interval, clock_interval);
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut probe = time::interval(seen_probe_interval);
        probe.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let probing = self.mailbox.wants_seen_probe();
            let event = tokio::select! {
                Some(event) = completions.recv() => event,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
                _ = clock.tick() => Event::Tick(Utc::now()),
                _ = probe.tick(), if probing => Event::SeenProbe(Utc::now()),
            };
            self.handle(event);
        }

        log::debug!("event channel closed, stopping dispatcher for {}", self.mailbox.name);
        self.mailbox
    }

    fn handle(&mut self, event: Event) {
        let outcome = self.mailbox.update(event);
        self.apply(outcome.effects, outcome.signals);
        self.state.send_replace(self.mailbox.clone());
    }

    fn apply(&self, effects: Vec<Effect>, signals: Vec<Signal>) {
        for signal in signals {
            if self.signals.send(signal).is_err() {
                log::debug!("signal receiver dropped");
            }
        }
        for effect in effects {
            self.execute(effect);
        }
    }

    /// Start one effect; its completion is queued as an event.
    fn execute(&self, effect: Effect) {
        let client = Arc::clone(&self.client);
        let completions = self.completions.clone();

        tokio::spawn(async move {
            let event = match effect {
                Effect::FetchList { mailbox } => {
                    Event::ListLoaded(stringify(client.list_mailbox(&mailbox).await))
                }
                Effect::FetchMessage { mailbox, id } => {
                    let result = stringify(client.get_message(&mailbox, &id).await);
                    Event::MessageLoaded { id, result }
                }
                Effect::MarkSeen { mailbox, id } => {
                    let result = stringify(client.mark_seen(&mailbox, &id).await);
                    Event::MarkedSeen { id, result }
                }
                Effect::Delete { mailbox, id } => {
                    let result = stringify(client.delete_message(&mailbox, &id).await);
                    Event::Deleted { id, result }
                }
                Effect::Purge { mailbox } => {
                    Event::Purged(stringify(client.purge_mailbox(&mailbox).await))
                }
                Effect::StampOpened { id } => Event::Opened { id, at: Utc::now() },
            };
            // The dispatcher may have stopped while the request was in flight.
            let _ = completions.send(event);
        });
    }
}

fn stringify<T>(result: crate::Result<T>) -> Result<T, String> {
    result.map_err(|err| err.to_string())
}
