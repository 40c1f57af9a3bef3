//! Group management.

use stockpile_core::{Group, GroupId, GroupInput};
use tracing::{debug, instrument};

use super::ApiClient;
use super::types::{DeletedGroupEnvelope, GroupEnvelope, GroupsEnvelope, JoinGroupRequest};
use crate::pipeline::{ApiError, RequestSpec};

impl ApiClient {
    /// Groups the signed-in user belongs to.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        let envelope: GroupsEnvelope = self.pipeline().execute(RequestSpec::get("groups")).await?;
        debug!(count = envelope.groups.len(), "Fetched groups");
        Ok(envelope.groups)
    }

    /// Create a group owned by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_group(&self, input: &GroupInput) -> Result<Group, ApiError> {
        let spec = RequestSpec::post("groups").json(input)?;
        let envelope: GroupEnvelope = self.pipeline().execute(spec).await?;
        Ok(envelope.group)
    }

    /// Rename a group.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self, input), fields(group_id = %id))]
    pub async fn update_group(&self, id: &GroupId, input: &GroupInput) -> Result<Group, ApiError> {
        let spec = RequestSpec::put("groups").segment(id.as_str()).json(input)?;
        let envelope: GroupEnvelope = self.pipeline().execute(spec).await?;
        Ok(envelope.group)
    }

    /// Delete a group and everything in it. Returns the server's copy of
    /// the removed group when the response carries one.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error if the request fails.
    #[instrument(skip(self), fields(group_id = %id))]
    pub async fn delete_group(&self, id: &GroupId) -> Result<Option<Group>, ApiError> {
        let spec = RequestSpec::delete("groups").segment(id.as_str());
        let envelope: Option<DeletedGroupEnvelope> = self.pipeline().execute(spec).await?;
        Ok(envelope.and_then(|e| e.group))
    }

    /// Join an existing group with its invite code.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` (usually 404) for an unknown code.
    #[instrument(skip(self, invite_code))]
    pub async fn join_group(&self, invite_code: &str) -> Result<Group, ApiError> {
        let spec = RequestSpec::post("groups")
            .segment("join")
            .json(&JoinGroupRequest {
                invite_code: invite_code.trim(),
            })?;
        let envelope: GroupEnvelope = self.pipeline().execute(spec).await?;
        debug!(group_id = %envelope.group.id, "Joined group");
        Ok(envelope.group)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::test_support::client_for;

    #[tokio::test]
    async fn test_list_groups_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "groups": [
                    { "id": "g1", "name": "Home", "inviteCode": "ABC123" },
                    { "id": "g2", "name": "Cabin" }
                ]
            })))
            .mount(&server)
            .await;

        let groups = client_for(&server).list_groups().await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].invite_code.as_deref(), Some("ABC123"));
        assert_eq!(groups[1].id, GroupId::new("g2"));
    }

    #[tokio::test]
    async fn test_join_group_posts_invite_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/groups/join"))
            .and(body_json(json!({ "inviteCode": "ABC123" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "group": { "id": "g1", "name": "Home" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let group = client_for(&server).join_group(" ABC123 ").await.unwrap();
        assert_eq!(group.name, "Home");
    }

    #[tokio::test]
    async fn test_delete_group_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/groups/g1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let deleted = client_for(&server)
            .delete_group(&GroupId::new("g1"))
            .await
            .unwrap();
        assert!(deleted.is_none());
    }

    #[tokio::test]
    async fn test_delete_group_returns_server_copy() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/groups/g1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Group deleted",
                "group": { "id": "g1", "name": "Home" }
            })))
            .mount(&server)
            .await;

        let deleted = client_for(&server)
            .delete_group(&GroupId::new("g1"))
            .await
            .unwrap();
        assert_eq!(deleted.map(|g| g.name), Some("Home".to_owned()));
    }
}
