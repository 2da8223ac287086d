//! Slack Events API endpoint.
//!
//! ```text
//! POST /slack/events
//! ```
//!
//! Every accepted delivery is answered with `200` whether it was recorded,
//! ignored or dropped, so Slack does not retry it. Storage and reply failures
//! surface as `5xx`; Slack then redelivers, which the ledger tolerates.

use actix_web::{HttpRequest, HttpResponse, post, web};
use tracing::{debug, info};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::slack_dto::{ChallengeResponse, EventEnvelope};
use crate::inbound::http::state::HttpState;

/// Header Slack sets on redeliveries.
pub const RETRY_NUM_HEADER: &str = "X-Slack-Retry-Num";
/// Header naming why Slack redelivered.
pub const RETRY_REASON_HEADER: &str = "X-Slack-Retry-Reason";

fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

/// Receive an Events API delivery.
#[utoipa::path(
    post,
    path = "/slack/events",
    description = "Slack Events API callback. Answers URL verification and \
        applies channel message events to the ledger.",
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Delivery acknowledged", body = ChallengeResponse),
        (status = 400, description = "Malformed body or signature headers", body = Error),
        (status = 401, description = "Signature mismatch or stale timestamp", body = Error),
        (status = 500, description = "Ledger failure", body = Error),
        (status = 503, description = "Store or Slack unavailable", body = Error)
    ),
    tags = ["slack"],
    operation_id = "receiveSlackEvent"
)]
#[post("/slack/events")]
pub async fn slack_events(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    state.verifier.verify(req.headers(), &body)?;

    if let Some(retry) = header_str(&req, RETRY_NUM_HEADER) {
        info!(
            retry_num = retry,
            retry_reason = header_str(&req, RETRY_REASON_HEADER).unwrap_or("unknown"),
            "slack redelivery"
        );
    }

    let envelope: EventEnvelope = serde_json::from_slice(&body)
        .map_err(|err| Error::invalid_request(format!("malformed event payload: {err}")))?;

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            Ok(HttpResponse::Ok().json(ChallengeResponse { challenge }))
        }
        EventEnvelope::EventCallback { event } => {
            match event.into_inbound() {
                Some(inbound) => {
                    let outcome = state.ledger.handle(inbound).await?;
                    debug!(?outcome, "slack event handled");
                }
                None => debug!("slack event type not consumed"),
            }
            Ok(HttpResponse::Ok().finish())
        }
        EventEnvelope::Unsupported => Ok(HttpResponse::Ok().finish()),
    }
}
