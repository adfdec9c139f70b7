//! Typed access to the group endpoints of the JSON API.

use crate::client::{Client, JsonRequest};
use crate::constants::GET_GROUPS_ENDPOINT;
use crate::error::Result;
use crate::models::Group;

/// Group endpoints, borrowed from a [`Client`].
#[derive(Clone, Copy)]
pub struct GroupsApi<'c> {
    client: &'c Client,
}

impl<'c> GroupsApi<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    /// Lists all groups of the association.
    pub async fn get(&self) -> Result<Vec<Group>> {
        self.client
            .fetch_json(GET_GROUPS_ENDPOINT, JsonRequest::get())
            .await
    }
}
