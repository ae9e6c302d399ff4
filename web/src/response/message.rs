use domain::message::ConversationSummary;
use domain::{messages, Id};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ConversationSummaryResponse {
    #[schema(value_type = Uuid)]
    pub(crate) counterpart_id: Id,
    pub(crate) last_message: messages::Model,
    pub(crate) unread_count: u64,
}

impl From<ConversationSummary> for ConversationSummaryResponse {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            counterpart_id: summary.counterpart_id,
            last_message: summary.last_message,
            unread_count: summary.unread_count,
        }
    }
}
