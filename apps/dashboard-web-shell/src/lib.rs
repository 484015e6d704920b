#[cfg(any(target_arch = "wasm32", test))]
mod shell_inputs;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;

    use dashboard_client_core::format::format_number_str;
    use dashboard_client_core::{
        AlertBoard, ApiClient, ClientConfig, ModalController, PageBootstrap, SessionContext,
        format,
    };
    use serde_json::Value;
    use tracing::{debug, warn};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use crate::shell_inputs::{alert_duration, alert_kind, decimals, parse_method};

    mod console;
    mod dom;
    mod network;
    mod routing;
    mod storage;

    use console::install_console_tracing;
    use dom::{DomModalRegistry, DomPageHost, mount_alert, on_document_ready};
    use network::GlooTransport;
    use routing::LocationNavigator;
    use storage::LocalStorageSessionStore;

    type ShellSession = SessionContext<LocalStorageSessionStore>;
    type ShellClient = ApiClient<GlooTransport, LocalStorageSessionStore>;

    thread_local! {
        static CONFIG: RefCell<ClientConfig> = RefCell::new(ClientConfig::default());
        static BOOTSTRAP: PageBootstrap = const { PageBootstrap::new() };
        static ALERTS: RefCell<AlertBoard> = RefCell::new(AlertBoard::new());
    }

    fn current_config() -> ClientConfig {
        CONFIG.with(|config| config.borrow().clone())
    }

    fn session() -> ShellSession {
        let config = current_config();
        SessionContext::new(LocalStorageSessionStore::new(&config.token_storage_key))
    }

    fn client() -> ShellClient {
        let config = current_config();
        let store = LocalStorageSessionStore::new(&config.token_storage_key);
        ApiClient::new(config, GlooTransport, SessionContext::new(store))
    }

    fn modals() -> ModalController<DomModalRegistry> {
        ModalController::new(DomModalRegistry)
    }

    fn js_error(message: impl AsRef<str>) -> JsValue {
        js_sys::Error::new(message.as_ref()).into()
    }

    fn js_to_json(value: &JsValue) -> Result<Option<Value>, JsValue> {
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        let text: String = js_sys::JSON::stringify(value)?.into();
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|error| js_error(format!("request body is not JSON: {error}")))
    }

    fn json_to_js(value: &Value) -> Result<JsValue, JsValue> {
        if value.is_null() {
            return Ok(JsValue::NULL);
        }
        js_sys::JSON::parse(&value.to_string())
    }

    fn initialize_page() {
        let session = session();
        let mut host = DomPageHost;
        let outcome = BOOTSTRAP.with(|bootstrap| bootstrap.initialize(&session, &mut host));
        debug!(?outcome, "page initialized");
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        install_console_tracing();
        if let Err(error) = on_document_ready(initialize_page) {
            warn!(%error, "page bootstrap not scheduled");
        }
    }

    /// Points the client at a different API base (default `/api`).
    #[wasm_bindgen]
    pub fn configure(base_url: String) -> Result<(), JsValue> {
        let config =
            ClientConfig::with_base_url(&base_url).map_err(|error| js_error(error.to_string()))?;
        CONFIG.with(|slot| *slot.borrow_mut() = config);
        Ok(())
    }

    /// Resolves with the parsed JSON body, or rejects with an `Error` whose
    /// message is the backend's `detail`/`message`.
    #[wasm_bindgen]
    pub async fn api_request(
        endpoint: String,
        method: Option<String>,
        body: JsValue,
    ) -> Result<JsValue, JsValue> {
        let method = parse_method(method.as_deref()).map_err(js_error)?;
        let body = js_to_json(&body)?;
        let value = client()
            .request(&endpoint, method, body.as_ref())
            .await
            .map_err(|error| js_error(error.to_string()))?;
        json_to_js(&value)
    }

    /// Password login; stores the issued token and resolves with the decoded
    /// user claims.
    #[wasm_bindgen]
    pub async fn login(username: String, password: String) -> Result<JsValue, JsValue> {
        let client = client();
        client
            .login(&username, &password)
            .await
            .map_err(|error| js_error(error.to_string()))?;
        let claims = client
            .session()
            .current_user()
            .map(|user| Value::Object(user.into_claims()))
            .unwrap_or(Value::Null);
        json_to_js(&claims)
    }

    #[wasm_bindgen]
    pub fn get_token() -> Option<String> {
        session().token()
    }

    #[wasm_bindgen]
    pub fn set_token(token: String) -> Result<(), JsValue> {
        session()
            .set_token(&token)
            .map_err(|error| js_error(error.to_string()))
    }

    #[wasm_bindgen]
    pub fn clear_token() -> Result<(), JsValue> {
        session()
            .clear_token()
            .map_err(|error| js_error(error.to_string()))
    }

    #[wasm_bindgen]
    pub fn current_user_json() -> Option<String> {
        let user = session().current_user()?;
        serde_json::to_string(&user).ok()
    }

    #[wasm_bindgen]
    pub fn protect_page() -> bool {
        session().protect_page(&LocationNavigator)
    }

    #[wasm_bindgen]
    pub fn logout() {
        session().logout(&LocationNavigator);
    }

    #[wasm_bindgen]
    pub fn redirect_to_dashboard() -> String {
        session()
            .redirect_to_dashboard(&LocationNavigator)
            .path()
            .to_string()
    }

    #[wasm_bindgen]
    pub fn show_alert(message: String, kind: Option<String>, duration_ms: Option<f64>) {
        let kind = alert_kind(kind.as_deref());
        let duration = alert_duration(duration_ms);
        let alert = ALERTS.with(|board| {
            let mut board = board.borrow_mut();
            let id = board.show(message, kind, duration);
            board.visible().find(|alert| alert.id == id).cloned()
        });
        let Some(alert) = alert else {
            return;
        };
        let id = alert.id;
        let dismiss = move || {
            ALERTS.with(|board| {
                board.borrow_mut().dismiss(id);
            });
        };
        if let Err(error) = mount_alert(&alert, dismiss) {
            warn!(%error, "alert not shown");
            ALERTS.with(|board| {
                board.borrow_mut().dismiss(id);
            });
        }
    }

    #[wasm_bindgen]
    pub fn format_date(input: String) -> String {
        format::format_date(&input)
    }

    /// Accepts numbers and numeric strings; anything else renders as `NaN`.
    #[wasm_bindgen]
    pub fn format_number(value: JsValue, decimals_arg: Option<f64>) -> String {
        let decimals = decimals(decimals_arg);
        match (value.as_f64(), value.as_string()) {
            (Some(number), _) => format::format_number(number, decimals),
            (None, Some(text)) => format_number_str(&text, decimals),
            (None, None) => format::format_number(f64::NAN, decimals),
        }
    }

    #[wasm_bindgen]
    pub fn status_badge(status: String) -> String {
        format::status_badge(&status)
    }

    #[wasm_bindgen]
    pub fn open_modal(modal_id: String) -> bool {
        modals().open(&modal_id)
    }

    #[wasm_bindgen]
    pub fn close_modal(modal_id: String) -> bool {
        modals().close(&modal_id)
    }

    #[wasm_bindgen]
    pub fn close_all_modals() -> u32 {
        modals().close_all() as u32
    }

    fn event_element(event: &web_sys::Event) -> Option<web_sys::Element> {
        event.target()?.dyn_into::<web_sys::Element>().ok()
    }
}
