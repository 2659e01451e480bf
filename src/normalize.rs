//! Response normalization.
//!
//! Maps raw directory records, whose shape varies by search kind and by
//! whether a minimal result was requested, onto `UserRecord` / `GroupRecord`.
//! Absent or mistyped fields stay absent. The only derived field is
//! `UserRecord::username_or_account_id`, which is always populated.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{json_kind, ShapeMismatch};

/// A raw record as returned by the directory service.
pub type RawDirectoryRecord = Map<String, Value>;

/// Which canonical record a raw record is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    User,
    UserMin,
    Group,
    GroupMin,
}

impl RecordKind {
    pub fn user(minimal: bool) -> Self {
        if minimal {
            RecordKind::UserMin
        } else {
            RecordKind::User
        }
    }

    pub fn group(minimal: bool) -> Self {
        if minimal {
            RecordKind::GroupMin
        } else {
            RecordKind::Group
        }
    }

    pub fn is_minimal(self) -> bool {
        matches!(self, RecordKind::UserMin | RecordKind::GroupMin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::User => "user",
            RecordKind::UserMin => "userMin",
            RecordKind::Group => "group",
            RecordKind::GroupMin => "groupMin",
        }
    }
}

/// Canonical user.
///
/// The minimal variant fills `name`, `display_name`, `account_id` and the
/// derived `username_or_account_id` only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// `account_id` when non-empty, otherwise `name`.
    pub username_or_account_id: String,
}

/// Canonical group.
///
/// The minimal variant fills `name` and `display_name` only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// Either canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DirectoryRecord {
    User(UserRecord),
    Group(GroupRecord),
}

/// Normalize one raw record.
pub fn normalize(kind: RecordKind, raw: &RawDirectoryRecord) -> DirectoryRecord {
    match kind {
        RecordKind::User | RecordKind::UserMin => {
            DirectoryRecord::User(normalize_user(raw, kind.is_minimal()))
        }
        RecordKind::Group | RecordKind::GroupMin => {
            DirectoryRecord::Group(normalize_group(raw, kind.is_minimal()))
        }
    }
}

pub fn normalize_user(raw: &RawDirectoryRecord, minimal: bool) -> UserRecord {
    let name = string_field(raw, "name");
    let account_id = string_field(raw, "accountId");
    let username_or_account_id = username_or_account_id(account_id.as_deref(), name.as_deref());

    let mut user = UserRecord {
        name,
        display_name: string_field(raw, "displayName"),
        account_id,
        username_or_account_id,
        ..Default::default()
    };

    if !minimal {
        user.active = bool_field(raw, "active");
        user.key = string_field(raw, "key");
        user.email_address = string_field(raw, "emailAddress");
        user.time_zone = string_field(raw, "timeZone");
        user.avatar_url = raw
            .get("avatarUrls")
            .and_then(|urls| urls.get("48x48"))
            .and_then(Value::as_str)
            .map(str::to_string);
    }

    user
}

pub fn normalize_group(raw: &RawDirectoryRecord, minimal: bool) -> GroupRecord {
    // The group picker only returns highlighted `html`, not a display name.
    let display_name = string_field(raw, "displayName")
        .or_else(|| string_field(raw, "html").map(|html| strip_tags(&html)));

    let mut group = GroupRecord {
        name: string_field(raw, "name"),
        display_name,
        ..Default::default()
    };

    if !minimal {
        group.active = bool_field(raw, "active");
        group.group_id = string_field(raw, "groupId");
        group.labels = raw
            .get("labels")
            .and_then(Value::as_array)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(|label| label.get("text").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
    }

    group
}

/// `account_id` when present and non-empty, else `name`, else empty.
pub fn username_or_account_id(account_id: Option<&str>, name: Option<&str>) -> String {
    match account_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => name.unwrap_or_default().to_string(),
    }
}

/// Normalize a user search payload, which must be a bare array of objects.
pub fn normalize_users(payload: &Value, minimal: bool) -> Result<Vec<UserRecord>, ShapeMismatch> {
    let records = records_of(payload)?;
    Ok(records
        .into_iter()
        .map(|raw| normalize_user(raw, minimal))
        .collect())
}

/// Normalize a group search payload, which must be an object with a `groups` array.
pub fn normalize_groups(
    payload: &Value,
    minimal: bool,
) -> Result<Vec<GroupRecord>, ShapeMismatch> {
    let body = payload
        .as_object()
        .ok_or_else(|| ShapeMismatch::NotAnObject(json_kind(payload)))?;
    let groups = body
        .get("groups")
        .ok_or(ShapeMismatch::MissingKey("groups"))?;
    let records = records_of(groups)?;
    Ok(records
        .into_iter()
        .map(|raw| normalize_group(raw, minimal))
        .collect())
}

fn records_of(value: &Value) -> Result<Vec<&RawDirectoryRecord>, ShapeMismatch> {
    let items = value
        .as_array()
        .ok_or_else(|| ShapeMismatch::NotAnArray(json_kind(value)))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object().ok_or(ShapeMismatch::RecordNotObject {
                index,
                found: json_kind(item),
            })
        })
        .collect()
}

fn string_field(raw: &RawDirectoryRecord, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_field(raw: &RawDirectoryRecord, key: &str) -> Option<bool> {
    raw.get(key).and_then(Value::as_bool)
}

fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}
