use tracing::debug;

use crate::capabilities::{HttpError, HttpRequest, HttpResult};
use crate::config::SosConfig;
use crate::gate::DispatchPermit;
use crate::model::{AlertPayload, DispatchOutcome};
use crate::MAX_DETAIL_BYTES;

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Builds the one alert request a permit allows and classifies its result.
/// Holds no state and never retries.
pub struct AlertDispatcher;

impl AlertDispatcher {
    pub fn prepare(
        permit: DispatchPermit,
        payload: &AlertPayload,
        config: &SosConfig,
    ) -> Result<HttpRequest, HttpError> {
        let request = HttpRequest::post(config.sos_endpoint().clone())
            .with_json(payload)?
            .with_timeout_ms(config.dispatch_timeout_ms())?
            .with_header("Accept", "application/json")?
            .with_header(IDEMPOTENCY_HEADER, permit.session().as_str())?;

        debug!(
            session = %permit.session(),
            request_id = request.request_id(),
            endpoint = config.sos_endpoint().as_str(),
            "alert request prepared"
        );
        Ok(request)
    }

    pub fn classify(result: &HttpResult) -> DispatchOutcome {
        match result {
            Ok(response) if response.is_success() => DispatchOutcome::Success,
            Ok(response) => {
                debug!(
                    status = response.status(),
                    request_id = response.request_id(),
                    "alert rejected by server"
                );
                let body = response.body_text();
                let detail = if body.trim().is_empty() {
                    format!("Server responded with {}", response.status())
                } else {
                    truncate(body.trim())
                };
                DispatchOutcome::ServerRejected {
                    status: response.status(),
                    detail,
                }
            }
            Err(HttpError::HttpStatus {
                status, message, ..
            }) => DispatchOutcome::ServerRejected {
                status: *status,
                detail: truncate(message),
            },
            Err(e) => DispatchOutcome::TransportFailure {
                detail: truncate(&e.to_string()),
            },
        }
    }
}

fn truncate(detail: &str) -> String {
    if detail.len() <= MAX_DETAIL_BYTES {
        return detail.to_string();
    }
    let mut end = MAX_DETAIL_BYTES;
    while !detail.is_char_boundary(end) {
        end -= 1;
    }
    detail[..end].to_string()
}
