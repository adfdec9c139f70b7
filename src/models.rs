//! Public data models returned by the client.

use crate::constants::{default_timeout, DEFAULT_MAX_REDIRECTS, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the association, e.g. `https://www.vereinonline.org/IHRVEREIN/`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Optional proxy for all requests.
    pub proxy_url: Option<String>,
    pub user_agent: String,
    /// Maximum number of `302` hops followed by HTML requests.
    pub max_redirects: usize,
    /// Repair double-encoded strings in JSON responses.
    pub repair_double_encoding: bool,
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: default_timeout(),
            proxy_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            repair_double_encoding: true,
        }
    }
}

/// A mail template as shown in the admin forms.
///
/// `subject` and `html_body` are `None` when the template's category has no
/// such field (layout templates have no subject).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailTemplate {
    /// Display name from the template navigation.
    #[serde(default)]
    pub name: String,
    /// Position in the template navigation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
}

impl MailTemplate {
    /// Template content for [`set`](crate::MailTemplateCategory::set).
    pub fn new(subject: impl Into<String>, html_body: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            html_body: Some(html_body.into()),
            ..Self::default()
        }
    }
}

/// One entry of the template selector list on an admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEntry {
    /// Anchor text, trimmed.
    pub name: String,
    /// Raw `href` attribute.
    pub href: String,
    /// Whether the list item is marked as the current template.
    pub is_active: bool,
    /// 0-based position in the list.
    pub index: usize,
}

/// A member record of the JSON API.
///
/// The commonly used columns are typed; every other column, including the
/// association's custom `key_*` fields, is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitgliedsnummer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anrede: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vorname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nachname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geburtstag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_strasse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_plz: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_ort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_land: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_telefon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_mobil: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aufnahmemitglied: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gekuendigt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitgliedstyp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userlogin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    /// Custom fields of the association (`key_*` columns).
    pub fn custom_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extra
            .iter()
            .filter(|(key, _)| key.starts_with("key_"))
            .map(|(key, value)| (key.as_str(), value))
    }
}

/// A member as returned by `GetMember`, with memberships resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberDetails {
    #[serde(flatten)]
    pub member: Member,
    #[serde(default)]
    pub rollen: Vec<String>,
    #[serde(default)]
    pub gruppen: Vec<String>,
    #[serde(default)]
    pub gruppenids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxmahnstufe: Option<String>,
}

/// A member group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub mandant: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beschreibung: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farbe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parentid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sichtbarkeit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
