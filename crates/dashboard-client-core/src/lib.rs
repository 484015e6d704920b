//! Host-independent client core for the role-based dashboard.
//!
//! Browser and native front ends plug their storage, transport, navigation
//! and DOM into the traits defined here: [`session::SessionStore`],
//! [`api::ApiTransport`], [`navigation::Navigator`],
//! [`modal::ModalRegistry`] and [`bootstrap::PageHost`].
//!
//! Identity decoded from the session token is advisory. The token signature
//! is never verified client-side; authorization decisions belong to the
//! backend.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod alerts;
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod format;
#[cfg(not(target_arch = "wasm32"))]
pub mod http;
pub mod modal;
pub mod models;
pub mod navigation;
pub mod session;
pub mod token;

pub use alerts::{Alert, AlertBoard, AlertId, AlertKind, DEFAULT_ALERT_DURATION};
pub use api::{
    ApiClient, ApiError, ApiRequest, ApiResponse, ApiTransport, HttpMethod, TransportError,
};
pub use bootstrap::{BootstrapOutcome, IdentityDisplay, IdentitySlot, PageBootstrap, PageHost};
pub use config::{ClientConfig, ConfigError, MissingTokenPolicy};
pub use format::{format_date, format_date_in, format_number, format_number_str, status_badge};
#[cfg(not(target_arch = "wasm32"))]
pub use http::ReqwestTransport;
pub use modal::{
    ClickTarget, InMemoryModalRegistry, ModalController, ModalRegistry, ModalSlot, ModalState,
};
pub use models::{
    AdminDashboard, DashboardSummary, EmployeeDashboard, HealthStatus, ManagerDashboard, NewUser,
    PerformanceReview, TokenResponse, UserRecord,
};
pub use navigation::{Navigator, PageRoute, RecordingNavigator};
pub use session::{MemorySessionStore, SessionContext, SessionStore, SessionStoreError};
pub use token::{DecodedUser, Role, TokenDecodeError, decode_token_payload};
