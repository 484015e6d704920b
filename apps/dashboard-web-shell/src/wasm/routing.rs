use dashboard_client_core::{Navigator, PageRoute};
use tracing::warn;

/// Full page loads through `window.location`.
pub(super) struct LocationNavigator;

impl Navigator for LocationNavigator {
    fn navigate(&self, route: PageRoute) {
        let Some(window) = web_sys::window() else {
            warn!(route = route.path(), "window is unavailable; navigation skipped");
            return;
        };
        if window.location().set_href(route.path()).is_err() {
            warn!(route = route.path(), "browser rejected navigation");
        }
    }
}
