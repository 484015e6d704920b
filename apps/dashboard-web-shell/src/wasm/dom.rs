use std::cell::RefCell;

use dashboard_client_core::alerts::ALERT_STYLE;
use dashboard_client_core::modal::MODAL_ACTIVE_CLASS;
use dashboard_client_core::{Alert, IdentitySlot, ModalRegistry, ModalState, PageHost};
use gloo_timers::callback::Timeout;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{event_element, modals};
use crate::shell_inputs::{ClickFacts, classify_click};

const MODAL_CLASS: &str = "modal";
const MODAL_SELECTOR: &str = ".modal";
const OPEN_MODAL_SELECTOR: &str = ".modal.active";
const CLOSE_BUTTON_SELECTOR: &str = ".close-btn";

thread_local! {
    static MODAL_CLICK_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
    static DOCUMENT_READY_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
}

fn document() -> Result<web_sys::Document, String> {
    web_sys::window()
        .ok_or_else(|| "window is unavailable".to_string())?
        .document()
        .ok_or_else(|| "document is unavailable".to_string())
}

/// Modal visibility as the `active` class on the modal elements themselves.
/// Lookup by id is only needed for `open_modal`/`close_modal`.
pub(super) struct DomModalRegistry;

impl ModalRegistry for DomModalRegistry {
    type Modal = web_sys::Element;

    fn find(&self, id: &str) -> Option<web_sys::Element> {
        document().ok()?.get_element_by_id(id)
    }

    fn state(&self, modal: &web_sys::Element) -> ModalState {
        if modal.class_list().contains(MODAL_ACTIVE_CLASS) {
            ModalState::Active
        } else {
            ModalState::Inactive
        }
    }

    fn set_state(&mut self, modal: &web_sys::Element, state: ModalState) -> bool {
        let classes = modal.class_list();
        let applied = match state {
            ModalState::Active => classes.add_1(MODAL_ACTIVE_CLASS),
            ModalState::Inactive => classes.remove_1(MODAL_ACTIVE_CLASS),
        };
        applied.is_ok()
    }

    fn active(&self) -> Vec<web_sys::Element> {
        let Ok(document) = document() else {
            return Vec::new();
        };
        let Ok(open) = document.query_selector_all(OPEN_MODAL_SELECTOR) else {
            return Vec::new();
        };
        (0..open.length())
            .filter_map(|index| open.item(index))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .collect()
    }
}

/// The live document as a bootstrap target.
pub(super) struct DomPageHost;

impl PageHost for DomPageHost {
    fn install_modal_handlers(&mut self) {
        if let Err(error) = install_modal_click_handler() {
            debug!(%error, "modal click handler not installed");
        }
    }

    fn set_identity_text(&mut self, slot: IdentitySlot, text: &str) -> bool {
        let Ok(document) = document() else {
            return false;
        };
        match document.query_selector(slot.selector()) {
            Ok(Some(element)) => {
                element.set_text_content(Some(text));
                true
            }
            _ => false,
        }
    }
}

fn install_modal_click_handler() -> Result<(), String> {
    let document = document()?;
    MODAL_CLICK_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event| {
            let Some(target) = event_element(&event) else {
                return;
            };
            let click = classify_click(click_facts(&target));
            modals().handle_click(&click);
        }));
        document
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
            .map_err(|_| "failed to register modal click handler".to_string())?;
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}

fn click_facts(target: &web_sys::Element) -> ClickFacts<web_sys::Element> {
    ClickFacts {
        in_close_button: matches!(target.closest(CLOSE_BUTTON_SELECTOR), Ok(Some(_))),
        enclosing_modal: target.closest(MODAL_SELECTOR).ok().flatten(),
        on_modal_itself: target.class_list().contains(MODAL_CLASS),
    }
}

/// Runs `ready` once the document is parsed: immediately if it already is,
/// otherwise on `DOMContentLoaded`.
pub(super) fn on_document_ready(ready: fn()) -> Result<(), String> {
    let document = document()?;
    if document.ready_state() != "loading" {
        ready();
        return Ok(());
    }
    DOCUMENT_READY_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            ready();
        }));
        document
            .add_event_listener_with_callback(
                "DOMContentLoaded",
                callback.as_ref().unchecked_ref(),
            )
            .map_err(|_| "failed to register DOMContentLoaded handler".to_string())?;
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}

/// Appends the toast to `<body>` and removes it after its duration.
pub(super) fn mount_alert(alert: &Alert, on_removed: impl FnOnce() + 'static) -> Result<(), String> {
    let document = document()?;
    let body = document
        .body()
        .ok_or_else(|| "document has no body".to_string())?;
    let element = document
        .create_element("div")
        .map_err(|_| "failed to create alert element".to_string())?;
    element.set_class_name(&alert.css_class());
    element
        .set_attribute("style", ALERT_STYLE)
        .map_err(|_| "failed to style alert element".to_string())?;
    element
        .set_attribute("role", "alert")
        .map_err(|_| "failed to label alert element".to_string())?;
    element.set_text_content(Some(&alert.message));
    body.append_child(&element)
        .map_err(|_| "failed to attach alert element".to_string())?;

    let millis = alert.duration.as_millis().min(u128::from(u32::MAX)) as u32;
    Timeout::new(millis, move || {
        element.remove();
        on_removed();
    })
    .forget();
    Ok(())
}
