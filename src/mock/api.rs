//! Client surface that bridge code depends on.
//!
//! Production code written against these traits can be driven by the real
//! Matrix client or by the mocks in this crate.

use std::future::Future;

use serde_json::Value;

use super::event::{MatrixEvent, RoomMembers, UserProfile};

/// Low-level Matrix client operations.
pub trait MatrixClientApi {
    type Error: std::error::Error;

    fn ban_user(&self, room_id: &str, user_id: &str);
    fn unban_user(&self, room_id: &str, user_id: &str);
    fn kick_user(&self, room_id: &str, user_id: &str);
    fn leave_room(&self, room_id: &str);
    fn send_message(&self, room_id: &str, content: &Value);
    fn send_event(&self, room_id: &str, body: &str, msgtype: &str);
    fn send_state_event(&self, room_id: &str, event_type: &str, state_key: &str, content: &Value);
    fn set_avatar_url(&self, avatar_url: &str);
    fn set_display_name(&self, display_name: &str);
    fn get_room_members(&self, room_id: &str) -> RoomMembers;

    fn get_user_profile(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send;

    fn get_room_state_event(
        &self,
        room_id: &str,
        event_type: &str,
        state_key: &str,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    fn get_event(
        &self,
        room_id: &str,
        event_id: &str,
    ) -> impl Future<Output = Result<MatrixEvent, Self::Error>> + Send;

    /// Upload media, returning its `mxc://` URI.
    fn upload_content(
        &self,
        data: &[u8],
        content_type: &str,
        filename: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    fn mxc_url_to_http(
        &self,
        mxc_url: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// A single acting identity: the bridge bot or a puppeted user.
pub trait IntentApi {
    type Client: MatrixClientApi;

    fn underlying_client(&self) -> &Self::Client;
    fn join(&self);
    fn join_room(&self);
    fn leave(&self);
    fn send_text(&self, room_id: &str, body: &str);
    fn send_event(&self, room_id: &str, body: &str);
}
