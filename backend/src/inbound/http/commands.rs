//! Slash-command endpoint for budget configuration.
//!
//! ```text
//! POST /slack/commands   (application/x-www-form-urlencoded)
//! ```
//!
//! The only recognised command is `set <integer>`. Malformed commands are
//! answered with a usage notice and a `200`, since Slack shows the reply
//! body to the invoking user.

use actix_web::{HttpRequest, HttpResponse, post, web};

use crate::domain::ports::EventOutcome;
use crate::domain::{CommandRejection, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::slack_dto::{SlashCommandForm, SlashCommandReply};
use crate::inbound::http::state::HttpState;

fn parse_form(body: &[u8]) -> Result<SlashCommandForm, Error> {
    let raw = std::str::from_utf8(body)
        .map_err(|_| Error::invalid_request("slash command body must be UTF-8"))?;
    web::Query::<SlashCommandForm>::from_query(raw)
        .map(web::Query::into_inner)
        .map_err(|err| Error::invalid_request(format!("malformed slash command: {err}")))
}

fn reply_text(form: &SlashCommandForm, outcome: &EventOutcome) -> String {
    match outcome {
        EventOutcome::BudgetSet { .. } => format!("Set budget to #{}", form.channel_name),
        other => other
            .user_notice()
            .unwrap_or_else(|| CommandRejection::InvalidFormat.user_notice())
            .to_owned(),
    }
}

/// Handle a `/moneysaver` invocation.
#[utoipa::path(
    post,
    path = "/slack/commands",
    description = "Slack slash command. `set <integer>` overwrites the channel's monthly budget.",
    request_body(content = String, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Reply shown to the invoking user", body = SlashCommandReply),
        (status = 400, description = "Malformed body or signature headers", body = Error),
        (status = 401, description = "Signature mismatch or stale timestamp", body = Error),
        (status = 500, description = "Budget could not be saved", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["slack"],
    operation_id = "runSlashCommand"
)]
#[post("/slack/commands")]
pub async fn slash_command(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    state.verifier.verify(req.headers(), &body)?;
    let form = parse_form(&body)?;

    let outcome = state.ledger.handle(form.to_inbound()).await?;

    Ok(HttpResponse::Ok().json(SlashCommandReply {
        text: reply_text(&form, &outcome),
    }))
}
