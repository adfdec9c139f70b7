//! Typed access to the member endpoints of the JSON API.

use crate::client::{Client, JsonRequest};
use crate::constants::{GET_MEMBERS_ENDPOINT, GET_MEMBER_ENDPOINT, UPDATE_MEMBER_ENDPOINT};
use crate::error::{Error, Result};
use crate::models::{Member, MemberDetails};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Search parameters of `GetMembers`. Unset parameters are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberQuery {
    #[serde(rename = "suche", skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(rename = "rolle", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "gruppe", skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(serialize_with = "comma_list", skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<String>,
    /// Columns to return; the server always adds `id`.
    #[serde(
        rename = "felder",
        serialize_with = "comma_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub fields: Vec<String>,
    #[serde(
        rename = "geloescht",
        serialize_with = "deleted_flag",
        skip_serializing_if = "is_false"
    )]
    pub include_deleted: bool,
}

impl MemberQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn sort<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn fields<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }
}

fn comma_list<S>(values: &[String], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&values.join(","))
}

fn deleted_flag<S>(_: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str("a")
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Member endpoints, borrowed from a [`Client`].
#[derive(Clone, Copy)]
pub struct MembersApi<'c> {
    client: &'c Client,
}

impl<'c> MembersApi<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client }
    }

    /// Searches members. Only the requested columns are filled in.
    pub async fn get(&self, query: &MemberQuery) -> Result<Vec<Member>> {
        let body = serde_json::to_value(query)?;
        self.client
            .fetch_json(GET_MEMBERS_ENDPOINT, JsonRequest::post_json(body))
            .await
    }

    /// Loads every column of one member, including roles and groups.
    pub async fn get_by_id(&self, member_id: &str) -> Result<MemberDetails> {
        let body = serde_json::json!({ "id": member_id });
        self.client
            .fetch_json(GET_MEMBER_ENDPOINT, JsonRequest::post_json(body))
            .await
    }

    /// Updates the given columns of a member and returns the stored record.
    ///
    /// `updates` must serialize to a JSON object; an `id` key in it is
    /// ignored in favour of `member_id`.
    pub async fn update<U>(&self, member_id: &str, updates: &U) -> Result<Member>
    where
        U: Serialize + ?Sized,
    {
        let body = update_body(member_id, serde_json::to_value(updates)?)?;
        self.client
            .fetch_json(UPDATE_MEMBER_ENDPOINT, JsonRequest::post_json(body))
            .await
    }
}

fn update_body(member_id: &str, updates: Value) -> Result<Value> {
    let fields = match updates {
        Value::Object(fields) => fields,
        Value::Null => Map::new(),
        other => {
            return Err(Error::InvalidInput(format!(
                "member updates must be an object, got {other}"
            )))
        }
    };
    let mut body = Map::new();
    body.insert("id".to_string(), Value::String(member_id.to_string()));
    body.extend(fields.into_iter().filter(|(key, _)| key != "id"));
    Ok(Value::Object(body))
}
