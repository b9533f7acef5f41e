use serde::Deserialize;

/// Body of `PUT /admin/users/:id/active`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub is_active: bool,
}
