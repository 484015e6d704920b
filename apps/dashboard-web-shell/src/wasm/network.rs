use async_trait::async_trait;
use dashboard_client_core::{ApiRequest, ApiResponse, ApiTransport, HttpMethod, TransportError};
use gloo_net::http::Request;

/// `fetch` transport. No timeout, no retry.
pub(super) struct GlooTransport;

#[async_trait(?Send)]
impl ApiTransport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => Request::get(&request.url),
            HttpMethod::Post => Request::post(&request.url),
            HttpMethod::Put => Request::put(&request.url),
            HttpMethod::Patch => Request::patch(&request.url),
            HttpMethod::Delete => Request::delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = match request.body {
            Some(body) => builder
                .body(body)
                .map_err(map_network_error)?
                .send()
                .await
                .map_err(map_network_error)?,
            None => builder.send().await.map_err(map_network_error)?,
        };

        let status = response.status();
        let body = response.text().await.map_err(map_network_error)?;
        Ok(ApiResponse { status, body })
    }
}

fn map_network_error(error: gloo_net::Error) -> TransportError {
    TransportError::new(error.to_string())
}
