//! Normalization of loosely typed arguments arriving from page scripts.

use std::time::Duration;

use dashboard_client_core::format::{DEFAULT_DECIMALS, MAX_DECIMALS};
use dashboard_client_core::{AlertKind, ClickTarget, DEFAULT_ALERT_DURATION, HttpMethod};

pub(crate) fn parse_method(raw: Option<&str>) -> Result<HttpMethod, String> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw.parse(),
        None => Ok(HttpMethod::Get),
    }
}

pub(crate) fn alert_kind(raw: Option<&str>) -> AlertKind {
    raw.map_or_else(AlertKind::default, AlertKind::parse)
}

/// Missing durations use the default; negative or NaN ones expire at once.
/// Browser timers cap out at `u32::MAX` milliseconds.
pub(crate) fn alert_duration(raw_ms: Option<f64>) -> Duration {
    match raw_ms {
        None => DEFAULT_ALERT_DURATION,
        Some(ms) if ms > 0.0 => Duration::from_millis(ms.min(f64::from(u32::MAX)) as u64),
        Some(_) => Duration::ZERO,
    }
}

pub(crate) fn decimals(raw: Option<f64>) -> usize {
    match raw {
        None => DEFAULT_DECIMALS,
        Some(value) if value.is_nan() || value <= 0.0 => 0,
        Some(value) => (value.trunc() as usize).min(MAX_DECIMALS),
    }
}

/// What the DOM reports about a click, before it is mapped to a
/// [`ClickTarget`]. `M` is whatever handle the host uses for a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClickFacts<M> {
    pub in_close_button: bool,
    pub enclosing_modal: Option<M>,
    pub on_modal_itself: bool,
}

pub(crate) fn classify_click<M>(facts: ClickFacts<M>) -> ClickTarget<M> {
    if facts.in_close_button {
        return ClickTarget::CloseButton {
            modal: facts.enclosing_modal,
        };
    }
    match facts.enclosing_modal {
        Some(modal) if facts.on_modal_itself => ClickTarget::Backdrop { modal },
        _ => ClickTarget::Content,
    }
}
