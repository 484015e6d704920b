//! Modal dialogs: shown and hidden by id, closed in bulk or from clicks.

use std::fmt;

use tracing::debug;

/// Class toggled on a modal element while it is shown.
pub const MODAL_ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Inactive,
    Active,
}

/// Where modal visibility actually lives: the DOM in a browser, a list
/// elsewhere. Modals are reached through `Modal` handles, so modals without an
/// id can still be closed in bulk or from a click.
pub trait ModalRegistry {
    type Modal: Clone + fmt::Debug;

    /// Looks a modal up by id.
    fn find(&self, id: &str) -> Option<Self::Modal>;
    fn state(&self, modal: &Self::Modal) -> ModalState;
    /// Returns `false` when the state could not be applied.
    fn set_state(&mut self, modal: &Self::Modal, state: ModalState) -> bool;
    /// Every currently active modal, with or without an id.
    fn active(&self) -> Vec<Self::Modal>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalSlot(usize);

#[derive(Debug, Clone)]
struct MemoryModal {
    id: Option<String>,
    state: ModalState,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryModalRegistry {
    modals: Vec<MemoryModal>,
}

impl InMemoryModalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modals<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut registry = Self::new();
        for id in ids {
            registry.register(id);
        }
        registry
    }

    /// Adds an inactive modal, or returns the existing one with this id.
    pub fn register(&mut self, id: impl Into<String>) -> ModalSlot {
        let id = id.into();
        if let Some(slot) = self.find(&id) {
            return slot;
        }
        self.push(Some(id))
    }

    /// Adds an inactive modal that has no id.
    pub fn register_anonymous(&mut self) -> ModalSlot {
        self.push(None)
    }

    fn push(&mut self, id: Option<String>) -> ModalSlot {
        self.modals.push(MemoryModal {
            id,
            state: ModalState::Inactive,
        });
        ModalSlot(self.modals.len() - 1)
    }
}

impl ModalRegistry for InMemoryModalRegistry {
    type Modal = ModalSlot;

    fn find(&self, id: &str) -> Option<ModalSlot> {
        self.modals
            .iter()
            .position(|modal| modal.id.as_deref() == Some(id))
            .map(ModalSlot)
    }

    fn state(&self, modal: &ModalSlot) -> ModalState {
        self.modals
            .get(modal.0)
            .map_or(ModalState::Inactive, |modal| modal.state)
    }

    fn set_state(&mut self, modal: &ModalSlot, state: ModalState) -> bool {
        match self.modals.get_mut(modal.0) {
            Some(slot) => {
                slot.state = state;
                true
            }
            None => false,
        }
    }

    fn active(&self) -> Vec<ModalSlot> {
        self.modals
            .iter()
            .enumerate()
            .filter(|(_, modal)| modal.state == ModalState::Active)
            .map(|(index, _)| ModalSlot(index))
            .collect()
    }
}

/// What a click landed on, as far as modals are concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget<M> {
    /// A close control; `modal` is the nearest enclosing modal, if any.
    CloseButton { modal: Option<M> },
    /// The modal backdrop itself, outside its content box.
    Backdrop { modal: M },
    /// Anything else, including content inside a modal.
    Content,
}

#[derive(Debug, Clone, Default)]
pub struct ModalController<R> {
    registry: R,
}

impl<R: ModalRegistry> ModalController<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn into_registry(self) -> R {
        self.registry
    }

    /// Shows the modal. Unknown ids are ignored.
    pub fn open(&mut self, id: &str) -> bool {
        let Some(modal) = self.registry.find(id) else {
            debug!(modal_id = id, "open ignored; no such modal");
            return false;
        };
        self.registry.set_state(&modal, ModalState::Active)
    }

    /// Hides the modal. Unknown or already hidden ids are ignored.
    pub fn close(&mut self, id: &str) -> bool {
        let Some(modal) = self.registry.find(id) else {
            debug!(modal_id = id, "close ignored; no such modal");
            return false;
        };
        self.close_modal(&modal)
    }

    /// Hides one modal by handle; hidden modals are left alone.
    pub fn close_modal(&mut self, modal: &R::Modal) -> bool {
        self.registry.state(modal) == ModalState::Active
            && self.registry.set_state(modal, ModalState::Inactive)
    }

    /// Hides every open modal and returns how many were closed.
    pub fn close_all(&mut self) -> usize {
        self.registry
            .active()
            .iter()
            .filter(|modal| self.registry.set_state(modal, ModalState::Inactive))
            .count()
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.registry
            .find(id)
            .is_some_and(|modal| self.registry.state(&modal) == ModalState::Active)
    }

    /// Delegated click handling: close buttons close their enclosing modal,
    /// backdrop clicks close that modal, everything else is left alone.
    pub fn handle_click(&mut self, target: &ClickTarget<R::Modal>) -> bool {
        match target {
            ClickTarget::CloseButton { modal: Some(modal) } | ClickTarget::Backdrop { modal } => {
                self.close_modal(modal)
            }
            ClickTarget::CloseButton { modal: None } | ClickTarget::Content => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ModalController<InMemoryModalRegistry> {
        ModalController::new(InMemoryModalRegistry::with_modals([
            "edit-user",
            "add-kpi",
        ]))
    }

    fn slot(modals: &ModalController<InMemoryModalRegistry>, id: &str) -> ModalSlot {
        modals.registry().find(id).expect("registered modal")
    }

    #[test]
    fn open_and_close_toggle_state() {
        let mut modals = controller();
        assert!(modals.open("edit-user"));
        assert!(modals.is_open("edit-user"));
        assert!(!modals.is_open("add-kpi"));

        assert!(modals.close("edit-user"));
        assert!(!modals.is_open("edit-user"));
        assert!(!modals.close("edit-user"));
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut modals = controller();
        assert!(!modals.open("missing"));
        assert!(!modals.close("missing"));
        assert!(!modals.is_open("missing"));
        assert_eq!(modals.registry().find("missing"), None);
    }

    #[test]
    fn registering_an_id_twice_keeps_one_modal() {
        let mut registry = InMemoryModalRegistry::with_modals(["m1"]);
        let first = registry.find("m1").expect("registered");
        assert_eq!(registry.register("m1"), first);
    }

    #[test]
    fn close_all_hides_every_open_modal() {
        let mut modals = controller();
        modals.open("edit-user");
        modals.open("add-kpi");
        assert_eq!(modals.close_all(), 2);
        assert!(modals.registry().active().is_empty());
        assert_eq!(modals.close_all(), 0);
    }

    #[test]
    fn close_all_reaches_modals_without_id() {
        let mut modals = controller();
        let anonymous = modals.registry_mut().register_anonymous();
        assert!(modals.registry_mut().set_state(&anonymous, ModalState::Active));
        modals.open("edit-user");

        assert_eq!(modals.close_all(), 2);
        assert_eq!(modals.registry().state(&anonymous), ModalState::Inactive);
    }

    #[test]
    fn clicks_close_only_their_modal() {
        let mut modals = controller();
        modals.open("edit-user");
        modals.open("add-kpi");
        let edit_user = slot(&modals, "edit-user");
        let add_kpi = slot(&modals, "add-kpi");

        assert!(!modals.handle_click(&ClickTarget::Content));
        assert!(!modals.handle_click(&ClickTarget::CloseButton { modal: None }));
        assert!(modals.handle_click(&ClickTarget::Backdrop { modal: add_kpi }));
        assert!(modals.is_open("edit-user"));
        assert!(!modals.is_open("add-kpi"));

        assert!(modals.handle_click(&ClickTarget::CloseButton {
            modal: Some(edit_user),
        }));
        assert!(!modals.is_open("edit-user"));
        assert!(!modals.handle_click(&ClickTarget::Backdrop { modal: edit_user }));
    }

    #[test]
    fn clicks_close_modals_without_id() {
        let mut registry = InMemoryModalRegistry::new();
        let anonymous = registry.register_anonymous();
        registry.set_state(&anonymous, ModalState::Active);
        let mut modals = ModalController::new(registry);

        assert!(modals.handle_click(&ClickTarget::CloseButton {
            modal: Some(anonymous),
        }));
        assert_eq!(modals.registry().state(&anonymous), ModalState::Inactive);

        modals.registry_mut().set_state(&anonymous, ModalState::Active);
        assert!(modals.handle_click(&ClickTarget::Backdrop { modal: anonymous }));
        assert!(modals.registry().active().is_empty());
    }
}
