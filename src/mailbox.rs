//! The mailbox screen state machine.
//!
//! [`Mailbox::update`] is the reducer: it consumes one [`Event`], replaces
//! the state, and describes the side effects to run ([`Effect`]) and the
//! notifications for the surrounding application ([`Signal`]). It performs
//! no I/O; [`Dispatcher`](crate::Dispatcher) executes the effects and feeds
//! their results back in as events.

use crate::client::message_path;
use crate::seen::VisibleMessage;
use crate::{Message, MessageHeader, MessageList, Settings};
use chrono::{DateTime, Utc};

/// Top-level screen state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxState {
    /// Waiting for the header list, optionally with a message to open once it arrives.
    LoadingList(Option<String>),
    ShowingList(MessageList, MessageState),
}

/// State of the detail pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageState {
    NoMessage,
    LoadingMessage,
    ShowingMessage(VisibleMessage),
    /// Previous message kept on screen while the next one is fetched.
    Transitioning(VisibleMessage),
}

impl MessageState {
    /// The message currently rendered, stale or not.
    pub fn visible(&self) -> Option<&VisibleMessage> {
        match self {
            Self::ShowingMessage(v) | Self::Transitioning(v) => Some(v),
            Self::NoMessage | Self::LoadingMessage => None,
        }
    }

    fn visible_mut(&mut self) -> Option<&mut VisibleMessage> {
        match self {
            Self::ShowingMessage(v) | Self::Transitioning(v) => Some(v),
            Self::NoMessage | Self::LoadingMessage => None,
        }
    }
}

/// Which body of the displayed message to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyMode {
    #[default]
    Html,
    Text,
}

/// Inputs to the reducer: user intents, timer ticks, and request completions.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Clock tick; only updates the clock.
    Tick(DateTime<Utc>),
    /// Re-fetch the header list.
    Refresh,
    ListLoaded(Result<Vec<MessageHeader>, String>),
    /// The user clicked a row.
    ClickMessage(String),
    /// A message was requested by route (e.g. a deep link).
    OpenMessage(String),
    MessageLoaded {
        id: String,
        result: Result<Message, String>,
    },
    /// The message with `id` was put on screen at `at`.
    Opened { id: String, at: DateTime<Utc> },
    /// Seen-deadline probe.
    SeenProbe(DateTime<Utc>),
    MarkedSeen {
        id: String,
        result: Result<(), String>,
    },
    DeleteMessage(String),
    Deleted {
        id: String,
        result: Result<(), String>,
    },
    Purge,
    Purged(Result<(), String>),
    SearchInput(String),
    SetBodyMode(BodyMode),
}

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchList { mailbox: String },
    FetchMessage { mailbox: String, id: String },
    /// Answer with [`Event::Opened`] carrying the current time.
    StampOpened { id: String },
    MarkSeen { mailbox: String, id: String },
    Delete { mailbox: String, id: String },
    Purge { mailbox: String },
}

/// Notifications for the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Push this application route into the history.
    Navigate(String),
    RecordVisited(String),
    /// Transient error text.
    Error(String),
    /// Suppress route handling for the navigation that follows.
    DisableRouting,
}

/// Everything one event asks of the outside world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub effects: Vec<Effect>,
    pub signals: Vec<Signal>,
}

impl Outcome {
    fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    fn error(self, context: &str, err: &str) -> Self {
        log::warn!("{context}: {err}");
        self.signal(Signal::Error(format!("{context}: {err}")))
    }
}

/// Selection update shared by clicks and route opens.
///
/// Marks `id` selected and keeps whatever is on screen until the new
/// message arrives.
pub fn select(mut list: MessageList, sub: MessageState, id: String) -> (MessageList, MessageState) {
    list.selected = Some(id);
    let sub = match sub {
        MessageState::NoMessage | MessageState::LoadingMessage => MessageState::LoadingMessage,
        MessageState::ShowingMessage(v) | MessageState::Transitioning(v) => {
            MessageState::Transitioning(v)
        }
    };
    (list, sub)
}

/// The mailbox screen controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub name: String,
    pub state: MailboxState,
    pub body_mode: BodyMode,
    pub now: DateTime<Utc>,
    pub settings: Settings,
}

impl Mailbox {
    /// Enter `LoadingList` for `name` and request the header list.
    ///
    /// `selection` is opened as soon as the list arrives.
    pub fn init(
        name: impl Into<String>,
        selection: Option<String>,
        now: DateTime<Utc>,
        settings: Settings,
    ) -> (Self, Outcome) {
        let mailbox = Self {
            name: name.into(),
            state: MailboxState::LoadingList(selection),
            body_mode: BodyMode::default(),
            now,
            settings,
        };
        let outcome = Outcome::default().effect(mailbox.fetch_list());
        (mailbox, outcome)
    }

    /// Whether the seen probe should be running.
    pub fn wants_seen_probe(&self) -> bool {
        matches!(
            &self.state,
            MailboxState::ShowingList(_, MessageState::ShowingMessage(v)) if v.wants_probe()
        )
    }

    /// The loaded list, or `None` while it is still loading.
    pub fn list(&self) -> Option<&MessageList> {
        match &self.state {
            MailboxState::ShowingList(list, _) => Some(list),
            MailboxState::LoadingList(_) => None,
        }
    }

    /// The detail pane, or `None` while the list is still loading.
    pub fn message_state(&self) -> Option<&MessageState> {
        match &self.state {
            MailboxState::ShowingList(_, sub) => Some(sub),
            MailboxState::LoadingList(_) => None,
        }
    }

    /// Apply one event.
    pub fn update(&mut self, event: Event) -> Outcome {
        match event {
            Event::Tick(now) => {
                self.now = now;
                Outcome::default()
            }
            Event::Refresh => Outcome::default().effect(self.fetch_list()),
            Event::ListLoaded(result) => self.list_loaded(result),
            Event::ClickMessage(id) => {
                let Some(list) = self.list() else {
                    log::debug!("ignoring click on {id} while the list is loading");
                    return Outcome::default();
                };
                if !list.contains(&id) {
                    return self.unknown_message(&id);
                }
                let path = message_path(&self.name, &id);
                let mut outcome = Outcome::default()
                    .signal(Signal::DisableRouting)
                    .signal(Signal::Navigate(path));
                outcome.effects.extend(self.open_message(id).effects);
                outcome
            }
            Event::OpenMessage(id) => self.open_message(id),
            Event::MessageLoaded { id, result } => self.message_loaded(id, result),
            Event::Opened { id, at } => {
                let delay = self.settings.mark_seen_delay;
                if let MailboxState::ShowingList(_, MessageState::ShowingMessage(v)) =
                    &mut self.state
                    && v.message.id == id
                {
                    v.opened(at, delay);
                }
                Outcome::default()
            }
            Event::SeenProbe(now) => self.seen_probe(now),
            Event::MarkedSeen { id, result } => match result {
                Ok(()) => {
                    if let MailboxState::ShowingList(list, sub) = &mut self.state {
                        list.mark_seen(&id);
                        if let Some(v) = sub.visible_mut()
                            && v.message.id == id
                        {
                            v.message.seen = true;
                        }
                    }
                    Outcome::default()
                }
                Err(err) => Outcome::default().error("Failed to mark message as seen", &err),
            },
            Event::DeleteMessage(id) => {
                let MailboxState::ShowingList(list, sub) = &mut self.state else {
                    return Outcome::default();
                };
                list.remove(&id);
                *sub = MessageState::NoMessage;
                Outcome::default().effect(Effect::Delete {
                    mailbox: self.name.clone(),
                    id,
                })
            }
            Event::Deleted { id, result } => match result {
                Ok(()) => Outcome::default(),
                Err(err) => Outcome::default().error(&format!("Failed to delete message {id}"), &err),
            },
            Event::Purge => {
                if self.list().is_none() {
                    return Outcome::default();
                }
                log::info!("purging mailbox {}", self.name);
                self.state = MailboxState::ShowingList(MessageList::default(), MessageState::NoMessage);
                Outcome::default().effect(Effect::Purge {
                    mailbox: self.name.clone(),
                })
            }
            Event::Purged(result) => match result {
                Ok(()) => Outcome::default(),
                Err(err) => Outcome::default().error("Failed to purge mailbox", &err),
            },
            Event::SearchInput(input) => {
                if let MailboxState::ShowingList(list, _) = &mut self.state {
                    list.set_search(&input);
                }
                Outcome::default()
            }
            Event::SetBodyMode(mode) => {
                self.body_mode = mode;
                Outcome::default()
            }
        }
    }

    fn fetch_list(&self) -> Effect {
        Effect::FetchList {
            mailbox: self.name.clone(),
        }
    }

    fn list_loaded(&mut self, result: Result<Vec<MessageHeader>, String>) -> Outcome {
        let headers = match result {
            Ok(headers) => headers,
            Err(err) => return Outcome::default().error("Failed to load mailbox", &err),
        };
        log::info!("loaded {} headers for {}", headers.len(), self.name);

        match &mut self.state {
            MailboxState::LoadingList(selection) => {
                let selection = selection.take();
                self.state =
                    MailboxState::ShowingList(MessageList::new(headers), MessageState::NoMessage);
                match selection {
                    Some(id) => self.open_message(id),
                    None => Outcome::default().signal(Signal::RecordVisited(self.name.clone())),
                }
            }
            MailboxState::ShowingList(list, _) => {
                list.headers = headers;
                Outcome::default()
            }
        }
    }

    fn open_message(&mut self, id: String) -> Outcome {
        if self.list().is_some_and(|list| !list.contains(&id)) {
            return self.unknown_message(&id);
        }
        match &mut self.state {
            MailboxState::LoadingList(selection) => {
                *selection = Some(id);
                Outcome::default()
            }
            MailboxState::ShowingList(list, sub) => {
                let (next_list, next_sub) = select(
                    std::mem::take(list),
                    std::mem::replace(sub, MessageState::NoMessage),
                    id.clone(),
                );
                *list = next_list;
                *sub = next_sub;
                Outcome::default().effect(Effect::FetchMessage {
                    mailbox: self.name.clone(),
                    id,
                })
            }
        }
    }

    /// Selection and pane stay as they are.
    fn unknown_message(&self, id: &str) -> Outcome {
        Outcome::default().error(
            "Failed to open message",
            &format!("{id} is not in mailbox {}", self.name),
        )
    }

    fn message_loaded(&mut self, id: String, result: Result<Message, String>) -> Outcome {
        let MailboxState::ShowingList(list, sub) = &mut self.state else {
            return Outcome::default();
        };
        if !list.is_selected(&id) {
            log::debug!("dropping stale response for message {id}");
            return Outcome::default();
        }
        match result {
            Ok(message) => {
                list.selected = Some(message.id.clone());
                let stamp = Effect::StampOpened {
                    id: message.id.clone(),
                };
                *sub = MessageState::ShowingMessage(VisibleMessage::new(message));
                Outcome::default().effect(stamp)
            }
            Err(err) => Outcome::default().error("Failed to load message", &err),
        }
    }

    fn seen_probe(&mut self, now: DateTime<Utc>) -> Outcome {
        let MailboxState::ShowingList(_, MessageState::ShowingMessage(v)) = &mut self.state else {
            return Outcome::default();
        };
        if !v.take_due(now) {
            return Outcome::default();
        }
        Outcome::default().effect(Effect::MarkSeen {
            mailbox: self.name.clone(),
            id: v.message.id.clone(),
        })
    }
}
