use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::swaps::{
    lifecycle::SwapStatus,
    repo::{Skill, SwapRequest},
};

/// Body of `POST /swaps`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapRequest {
    pub to_user_id: Uuid,
    pub offered_skill: Skill,
    pub wanted_skill: Skill,
    pub message: Option<String>,
}

/// Body of `PUT /swaps/:id/status` and its admin counterpart.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: SwapStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapResponse {
    pub message: String,
    pub swap_request: SwapRequest,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_parses_wire_body() {
        let req: CreateSwapRequest = serde_json::from_str(
            r#"{
                "toUserId": "7f1aa253-5f4c-4020-9d2c-7492e7c7a02a",
                "offeredSkill": {"name": "Go"},
                "wantedSkill": {"name": "Design"},
                "message": "trade?"
            }"#,
        )
        .unwrap();
        assert_eq!(req.offered_skill.name, "Go");
        assert_eq!(req.wanted_skill.name, "Design");
        assert_eq!(req.message.as_deref(), Some("trade?"));
    }

    #[test]
    fn status_body_rejects_unknown_values() {
        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status": "accepted"}"#).is_ok());
        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status": "cancelled"}"#).is_err());
    }
}
