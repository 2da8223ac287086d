//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the Slack callback endpoints, the health probes and
//! the JSON bodies they exchange. The document backs Swagger UI in debug
//! builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::slack_dto::{ChallengeResponse, SlashCommandReply};

/// OpenAPI document for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MoneySaver API",
        description = "Slack callbacks that record card expenditure against \
            per-channel monthly budgets, plus health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::events::slack_events,
        crate::inbound::http::commands::slash_command,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode, ChallengeResponse, SlashCommandReply)),
    tags(
        (name = "slack", description = "Slack Events API and slash command callbacks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
