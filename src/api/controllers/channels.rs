//! Channel Query Controllers
//!
//! - GET /apps/{appId}/channels - list occupied channels
//! - GET /apps/{appId}/channels/{channelName} - channel state
//! - GET /apps/{appId}/channels/{channelName}/users - subscribed users

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;

use crate::api::dto::{
    ChannelInfo, ChannelListResponse, ChannelResponse, UserInfo, UserListResponse,
};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

use super::param;

/// GET /apps/{appId}/channels
///
/// Every channel with at least one subscriber for the app.
pub async fn fetch_channels(
    state: &AppState,
    params: &HashMap<String, String>,
) -> ApiResult<Response> {
    let app_id = param(params, "appId")?;

    let names = state.hub.list_channels(app_id).await;
    let mut channels = Vec::with_capacity(names.len());
    for name in names {
        let subscription_count = state.hub.subscription_count(app_id, &name).await;
        channels.push(ChannelInfo {
            name,
            subscription_count,
        });
    }

    Ok(Json(ChannelListResponse {
        total: channels.len(),
        channels,
    })
    .into_response())
}

/// GET /apps/{appId}/channels/{channelName}
///
/// A channel nobody subscribes to is an empty-but-successful result,
/// not an error.
pub async fn fetch_channel(
    state: &AppState,
    params: &HashMap<String, String>,
) -> ApiResult<Response> {
    let app_id = param(params, "appId")?;
    let channel = param(params, "channelName")?;

    let subscription_count = state.hub.subscription_count(app_id, channel).await;

    Ok(Json(ChannelResponse {
        channel: channel.to_string(),
        occupied: subscription_count > 0,
        subscription_count,
    })
    .into_response())
}

/// GET /apps/{appId}/channels/{channelName}/users
///
/// A user is a subscribed connection id; richer identity would layer on
/// top of these ids.
pub async fn fetch_users(
    state: &AppState,
    params: &HashMap<String, String>,
) -> ApiResult<Response> {
    let app_id = param(params, "appId")?;
    let channel = param(params, "channelName")?;

    let users: Vec<UserInfo> = state
        .hub
        .list_users(app_id, channel)
        .await
        .into_iter()
        .map(|id| UserInfo { id })
        .collect();

    Ok(Json(UserListResponse {
        total: users.len(),
        users,
    })
    .into_response())
}
