//! Connection request service
//!
//! Friend-request lifecycle: send, accept, decline. Acceptance is the only
//! gate to a direct room, which is opened for the pair automatically.

use campus_core::entities::{ConnectionRequest, ConnectionStatus};
use campus_core::{DomainError, Snowflake};
use serde_json::json;
use tracing::{info, instrument};

use crate::dto::{ConnectionResponse, ConnectionWithProfiles};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::room::RoomService;

/// Connection request service
pub struct ConnectionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConnectionService<'a> {
    /// Create a new ConnectionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a connection request
    ///
    /// One live request per pair, in either direction. A previously
    /// declined request does not block a fresh attempt.
    #[instrument(skip(self))]
    pub async fn send_request(
        &self,
        requester_id: Snowflake,
        addressee_id: Snowflake,
    ) -> ServiceResult<ConnectionResponse> {
        if requester_id == addressee_id {
            return Err(DomainError::SelfConnectionRequest.into());
        }

        let addressee = self
            .ctx
            .profile_repo()
            .find_by_id(addressee_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", addressee_id.to_string()))?;

        let request =
            ConnectionRequest::new(self.ctx.generate_id(), requester_id, addressee_id);
        self.ctx.connection_repo().create(&request).await?;

        info!(
            request_id = %request.id,
            requester_id = %requester_id,
            addressee_id = %addressee_id,
            "Connection request sent"
        );

        let requester = self.ctx.profile_repo().find_by_id(requester_id).await?;

        let data = json!({
            "id": request.id.to_string(),
            "requester": {
                "id": requester_id.to_string(),
                "display_name": requester
                    .as_ref()
                    .map_or("Unknown", |p| p.display_name.as_str()),
            },
            "created_at": request.created_at.to_rfc3339(),
        });
        self.ctx
            .publisher()
            .publish_to_user(addressee_id, "CONNECTION_REQUEST", data)
            .await
            .ok();

        Ok(ConnectionResponse::from(ConnectionWithProfiles {
            request,
            requester,
            addressee: Some(addressee),
            room_id: None,
        }))
    }

    /// Accept a pending request
    ///
    /// Addressee only. Opens the pair's direct room and notifies both
    /// parties with its id.
    #[instrument(skip(self))]
    pub async fn accept(
        &self,
        request_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<ConnectionResponse> {
        let mut request = self.find_pending_for_addressee(request_id, user_id).await?;

        self.ctx
            .connection_repo()
            .update_status(request_id, ConnectionStatus::Accepted)
            .await?;
        request.accept();

        let (room, _created) = RoomService::new(self.ctx)
            .ensure_direct_room(request.requester_id, request.addressee_id)
            .await?;

        info!(
            request_id = %request_id,
            room_id = %room.id,
            "Connection accepted"
        );

        let data = json!({
            "id": request_id.to_string(),
            "requester_id": request.requester_id.to_string(),
            "addressee_id": request.addressee_id.to_string(),
            "room_id": room.id.to_string(),
        });
        self.ctx
            .publisher()
            .publish_to_users(
                &[request.requester_id, request.addressee_id],
                "CONNECTION_ACCEPTED",
                data,
            )
            .await
            .ok();

        self.respond(request, Some(room.id)).await
    }

    /// Decline a pending request
    ///
    /// Addressee only. The requester is not notified and may try again
    /// later.
    #[instrument(skip(self))]
    pub async fn decline(
        &self,
        request_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<ConnectionResponse> {
        let mut request = self.find_pending_for_addressee(request_id, user_id).await?;

        self.ctx
            .connection_repo()
            .update_status(request_id, ConnectionStatus::Declined)
            .await?;
        request.decline();

        info!(request_id = %request_id, "Connection declined");

        self.respond(request, None).await
    }

    /// List every request involving a user, newest first
    #[instrument(skip(self))]
    pub async fn list_for(&self, user_id: Snowflake) -> ServiceResult<Vec<ConnectionResponse>> {
        let requests = self.ctx.connection_repo().find_for_user(user_id).await?;

        let mut profile_ids: Vec<Snowflake> = requests
            .iter()
            .flat_map(|r| [r.requester_id, r.addressee_id])
            .collect();
        profile_ids.sort_unstable();
        profile_ids.dedup();
        let profiles = self.ctx.profile_repo().find_many(&profile_ids).await?;

        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            let room_id = if request.is_accepted() {
                self.ctx
                    .room_repo()
                    .find_direct(request.requester_id, request.addressee_id)
                    .await?
                    .map(|room| room.id)
            } else {
                None
            };

            let requester = profiles.iter().find(|p| p.id == request.requester_id).cloned();
            let addressee = profiles.iter().find(|p| p.id == request.addressee_id).cloned();

            responses.push(ConnectionResponse::from(ConnectionWithProfiles {
                request,
                requester,
                addressee,
                room_id,
            }));
        }

        Ok(responses)
    }

    /// Fetch a request, enforcing that the caller is its pending addressee
    async fn find_pending_for_addressee(
        &self,
        request_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<ConnectionRequest> {
        let request = self
            .ctx
            .connection_repo()
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Connection request", request_id.to_string()))?;

        if request.addressee_id != user_id {
            return Err(DomainError::NotRequestAddressee.into());
        }
        if !request.is_pending() {
            return Err(DomainError::RequestNotPending.into());
        }

        Ok(request)
    }

    async fn respond(
        &self,
        request: ConnectionRequest,
        room_id: Option<Snowflake>,
    ) -> ServiceResult<ConnectionResponse> {
        let ids = [request.requester_id, request.addressee_id];
        let profiles = self.ctx.profile_repo().find_many(&ids).await?;
        let requester = profiles.iter().find(|p| p.id == request.requester_id).cloned();
        let addressee = profiles.iter().find(|p| p.id == request.addressee_id).cloned();

        Ok(ConnectionResponse::from(ConnectionWithProfiles {
            request,
            requester,
            addressee,
            room_id,
        }))
    }
}
