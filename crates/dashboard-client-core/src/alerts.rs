//! Transient alert (toast) model.
//!
//! The browser shell renders each [`Alert`] as a fixed-position element and
//! removes it on a timer. Hosts without a DOM keep an [`AlertBoard`] and call
//! [`AlertBoard::prune`] as time passes.

use std::fmt;
use std::time::Duration;

use web_time::Instant;

pub const DEFAULT_ALERT_DURATION: Duration = Duration::from_millis(3000);

/// Inline style for the toast element.
pub const ALERT_STYLE: &str =
    "position: fixed; top: 20px; right: 20px; z-index: 9999; max-width: 400px;";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AlertKind {
    #[default]
    Success,
    Danger,
    Warning,
    Info,
    /// Any other suffix; it lands in the class list unchanged.
    Custom(String),
}

impl AlertKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "danger" => Self::Danger,
            "warning" => Self::Warning,
            "info" => Self::Info,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Custom(raw) => raw,
        }
    }

    pub fn css_class(&self) -> String {
        format!("alert alert-{}", self.as_str())
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertId(u64);

impl AlertId {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: AlertId,
    pub message: String,
    pub kind: AlertKind,
    pub duration: Duration,
}

impl Alert {
    pub fn css_class(&self) -> String {
        self.kind.css_class()
    }
}

#[derive(Debug)]
struct LiveAlert {
    alert: Alert,
    /// `None` when the duration runs past what `Instant` can represent.
    deadline: Option<Instant>,
}

/// Alerts currently on screen. Each one is independent; nothing is queued or
/// collapsed.
#[derive(Debug, Default)]
pub struct AlertBoard {
    next_id: u64,
    live: Vec<LiveAlert>,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        message: impl Into<String>,
        kind: AlertKind,
        duration: Duration,
    ) -> AlertId {
        self.show_at(message, kind, duration, Instant::now())
    }

    pub fn show_at(
        &mut self,
        message: impl Into<String>,
        kind: AlertKind,
        duration: Duration,
        now: Instant,
    ) -> AlertId {
        self.next_id += 1;
        let id = AlertId(self.next_id);
        self.live.push(LiveAlert {
            alert: Alert {
                id,
                message: message.into(),
                kind,
                duration,
            },
            deadline: now.checked_add(duration),
        });
        id
    }

    /// Drops every alert whose deadline is at or before `now` and returns them.
    pub fn prune(&mut self, now: Instant) -> Vec<Alert> {
        let (expired, live): (Vec<_>, Vec<_>) = self
            .live
            .drain(..)
            .partition(|entry| entry.deadline.is_some_and(|deadline| deadline <= now));
        self.live = live;
        expired.into_iter().map(|entry| entry.alert).collect()
    }

    pub fn dismiss(&mut self, id: AlertId) -> Option<Alert> {
        let index = self.live.iter().position(|entry| entry.alert.id == id)?;
        Some(self.live.remove(index).alert)
    }

    pub fn visible(&self) -> impl Iterator<Item = &Alert> {
        self.live.iter().map(|entry| &entry.alert)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
