use serde::Deserialize;
use uuid::Uuid;

/// Body of `POST /users/:userId/feedback`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub swap_request_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_body() {
        let req: FeedbackRequest = serde_json::from_str(
            r#"{"swapRequestId": "7f1aa253-5f4c-4020-9d2c-7492e7c7a02a", "rating": 5}"#,
        )
        .unwrap();
        assert_eq!(req.rating, 5);
        assert!(req.comment.is_none());
    }
}
