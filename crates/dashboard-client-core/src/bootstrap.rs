use std::num::FpCategory;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::debug;

use crate::session::{SessionContext, SessionStore};
use crate::token::DecodedUser;

pub const DEFAULT_USER_NAME: &str = "User";
pub const DEFAULT_USER_ROLE: &str = "Unknown";

/// Page elements that show who is signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentitySlot {
    UserName,
    UserRole,
}

impl IdentitySlot {
    #[must_use]
    pub fn selector(self) -> &'static str {
        match self {
            Self::UserName => ".user-name",
            Self::UserRole => ".user-role",
        }
    }
}

/// The page surface the bootstrap drives.
pub trait PageHost {
    fn install_modal_handlers(&mut self);
    /// Returns `false` when the page has no such slot.
    fn set_identity_text(&mut self, slot: IdentitySlot, text: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDisplay {
    pub name: String,
    pub role: String,
}

impl IdentityDisplay {
    /// Falsy claims (`""`, `0`, `false`, `null`) and structured ones fall back
    /// to the placeholders; other scalars are shown as written.
    pub fn from_user(user: &DecodedUser) -> Self {
        Self {
            name: claim_text(user, "name").unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
            role: claim_text(user, "role").unwrap_or_else(|| DEFAULT_USER_ROLE.to_string()),
        }
    }
}

fn claim_text(user: &DecodedUser, key: &str) -> Option<String> {
    match user.claim(key)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if !is_zero(number) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn is_zero(number: &serde_json::Number) -> bool {
    number
        .as_f64()
        .is_some_and(|value| value.classify() == FpCategory::Zero)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyInitialized,
    Anonymous,
    Identified(IdentityDisplay),
}

/// One-shot page initialization.
#[derive(Debug, Default)]
pub struct PageBootstrap {
    initialized: AtomicBool,
}

impl PageBootstrap {
    pub const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Installs modal handlers and fills the identity slots from the session.
    /// Only the first call on a given bootstrap does anything.
    pub fn initialize<S, H>(&self, session: &SessionContext<S>, host: &mut H) -> BootstrapOutcome
    where
        S: SessionStore,
        H: PageHost + ?Sized,
    {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return BootstrapOutcome::AlreadyInitialized;
        }

        host.install_modal_handlers();

        let Some(user) = session.current_user() else {
            debug!("page bootstrap: no signed-in user");
            return BootstrapOutcome::Anonymous;
        };
        let display = IdentityDisplay::from_user(&user);
        for (slot, text) in [
            (IdentitySlot::UserName, display.name.as_str()),
            (IdentitySlot::UserRole, display.role.as_str()),
        ] {
            if !host.set_identity_text(slot, text) {
                debug!(selector = slot.selector(), "identity slot missing from page");
            }
        }
        BootstrapOutcome::Identified(display)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::session::MemorySessionStore;

    // {"user_id":3,"role":"Employee","name":"Ada"}
    const NAMED_TOKEN: &str =
        "h.eyJ1c2VyX2lkIjozLCJyb2xlIjoiRW1wbG95ZWUiLCJuYW1lIjoiQWRhIn0.s";

    #[derive(Default)]
    struct FakePage {
        handler_installs: usize,
        slots: HashMap<IdentitySlot, Option<String>>,
    }

    impl FakePage {
        fn with_slots(slots: &[IdentitySlot]) -> Self {
            Self {
                handler_installs: 0,
                slots: slots.iter().map(|slot| (*slot, None)).collect(),
            }
        }

        fn text(&self, slot: IdentitySlot) -> Option<&str> {
            self.slots.get(&slot).and_then(|text| text.as_deref())
        }
    }

    impl PageHost for FakePage {
        fn install_modal_handlers(&mut self) {
            self.handler_installs += 1;
        }

        fn set_identity_text(&mut self, slot: IdentitySlot, text: &str) -> bool {
            match self.slots.get_mut(&slot) {
                Some(current) => {
                    *current = Some(text.to_string());
                    true
                }
                None => false,
            }
        }
    }

    #[test]
    fn fills_identity_slots_once() {
        let session = SessionContext::new(MemorySessionStore::with_token(NAMED_TOKEN));
        let mut page = FakePage::with_slots(&[IdentitySlot::UserName, IdentitySlot::UserRole]);
        let bootstrap = PageBootstrap::new();

        let outcome = bootstrap.initialize(&session, &mut page);
        assert_eq!(
            outcome,
            BootstrapOutcome::Identified(IdentityDisplay {
                name: "Ada".to_string(),
                role: "Employee".to_string(),
            })
        );
        assert_eq!(page.text(IdentitySlot::UserName), Some("Ada"));
        assert_eq!(page.text(IdentitySlot::UserRole), Some("Employee"));

        assert_eq!(
            bootstrap.initialize(&session, &mut page),
            BootstrapOutcome::AlreadyInitialized
        );
        assert_eq!(page.handler_installs, 1);
    }

    #[test]
    fn missing_claims_use_placeholders() {
        // {"user_id":1}
        let session = SessionContext::new(MemorySessionStore::with_token("h.eyJ1c2VyX2lkIjoxfQ.s"));
        let mut page = FakePage::with_slots(&[IdentitySlot::UserName, IdentitySlot::UserRole]);

        PageBootstrap::new().initialize(&session, &mut page);
        assert_eq!(page.text(IdentitySlot::UserName), Some(DEFAULT_USER_NAME));
        assert_eq!(page.text(IdentitySlot::UserRole), Some(DEFAULT_USER_ROLE));
    }

    #[test]
    fn anonymous_pages_still_get_modal_handlers() {
        let session = SessionContext::new(MemorySessionStore::new());
        let mut page = FakePage::with_slots(&[IdentitySlot::UserName]);

        let outcome = PageBootstrap::new().initialize(&session, &mut page);
        assert_eq!(outcome, BootstrapOutcome::Anonymous);
        assert_eq!(page.handler_installs, 1);
        assert_eq!(page.text(IdentitySlot::UserName), None);
    }

    #[test]
    fn missing_slots_are_skipped() {
        let session = SessionContext::new(MemorySessionStore::with_token(NAMED_TOKEN));
        let mut page = FakePage::with_slots(&[IdentitySlot::UserRole]);

        let outcome = PageBootstrap::new().initialize(&session, &mut page);
        assert!(matches!(outcome, BootstrapOutcome::Identified(_)));
        assert_eq!(page.text(IdentitySlot::UserRole), Some("Employee"));
        assert_eq!(page.text(IdentitySlot::UserName), None);
    }

    fn display_for(claims: &Value) -> IdentityDisplay {
        let claims = claims.as_object().cloned().expect("object claims");
        IdentityDisplay::from_user(&DecodedUser::from_claims(claims))
    }

    #[test]
    fn scalar_claims_are_shown_as_text() {
        assert_eq!(
            display_for(&json!({"name": 1042, "role": true})),
            IdentityDisplay {
                name: "1042".to_string(),
                role: "true".to_string(),
            }
        );
        assert_eq!(
            display_for(&json!({"name": 0, "role": ""})),
            IdentityDisplay {
                name: DEFAULT_USER_NAME.to_string(),
                role: DEFAULT_USER_ROLE.to_string(),
            }
        );
        assert_eq!(
            display_for(&json!({"name": false, "role": ["Admin"]})),
            IdentityDisplay {
                name: DEFAULT_USER_NAME.to_string(),
                role: DEFAULT_USER_ROLE.to_string(),
            }
        );
    }
}
