//! Wire DTOs for the reservation backend.
//!
//! DESIGN
//! ======
//! Payloads are parsed against fixed schemas. Anything that does not match is
//! a typed `ClientError::Parse`, never a heuristic search through arbitrary
//! keys. Numeric configuration fields tolerate `null`/missing (the store
//! applies documented defaults) but reject negative values.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ClientError;

pub const DEFAULT_SITE_NAME: &str = "Reservas Deportivas";
pub const DEFAULT_MAX_RESERVATIONS_PER_USER: u32 = 3;
pub const DEFAULT_CANCELLATION_LEAD_TIME_HOURS: u32 = 48;

// =============================================================================
// ROLES
// =============================================================================

/// Closed set of principals the client distinguishes.
///
/// Unknown wire names map to `Resident`, the least privileged authenticated role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Not logged in. Never sent by the backend.
    Visitor,
    Resident,
    Coordinator,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Wire name as the backend spells it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visitor => "visitante",
            Self::Resident => "usuario",
            Self::Coordinator => "coordinador",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }

    /// Map a backend role name onto the closed set.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "visitante" | "visitor" => Self::Visitor,
            "coordinador" | "coordinator" => Self::Coordinator,
            "admin" | "administrador" => Self::Admin,
            "superadmin" | "super_admin" | "super-admin" => Self::SuperAdmin,
            _ => Self::Resident,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// USER
// =============================================================================

/// Authenticated principal as returned by `/auth/me` and `/auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier; numeric ids are carried as their decimal string.
    #[serde(deserialize_with = "deserialize_opaque_id")]
    pub id: String,
    /// Display name.
    #[serde(alias = "nombre", default)]
    pub name: String,
    #[serde(alias = "correo", default)]
    pub email: String,
    #[serde(alias = "rol")]
    pub role: Role,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserEnvelope {
    Wrapped { user: User },
    Bare(User),
}

/// Parse a user from a session or login response body.
///
/// Accepts a bare user object or `{"user": {...}}`.
pub fn parse_user(body: &str) -> Result<User, ClientError> {
    match parse_json::<UserEnvelope>(body)? {
        UserEnvelope::Wrapped { user } | UserEnvelope::Bare(user) => Ok(user),
    }
}

// =============================================================================
// SYSTEM CONFIGURATION
// =============================================================================

/// District-wide operating parameters. Always complete: defaults are applied
/// when the backend omits a field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConfigurationPayload", rename_all = "camelCase")]
pub struct SystemConfiguration {
    pub site_name: String,
    pub description: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub max_reservations_per_user: u32,
    pub cancellation_lead_time_hours: u32,
    pub maintenance_mode: bool,
    pub registration_enabled: bool,
    pub reservations_enabled: bool,
}

impl Default for SystemConfiguration {
    fn default() -> Self {
        ConfigurationPayload::default().into()
    }
}

impl SystemConfiguration {
    /// Produce the full object that results from applying `patch`.
    #[must_use]
    pub fn merged(&self, patch: &ConfigurationPatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = &patch.site_name {
            next.site_name.clone_from(v);
        }
        if let Some(v) = &patch.description {
            next.description.clone_from(v);
        }
        if let Some(v) = &patch.contact_email {
            next.contact_email.clone_from(v);
        }
        if let Some(v) = &patch.contact_phone {
            next.contact_phone.clone_from(v);
        }
        if let Some(v) = patch.max_reservations_per_user {
            next.max_reservations_per_user = v;
        }
        if let Some(v) = patch.cancellation_lead_time_hours {
            next.cancellation_lead_time_hours = v;
        }
        if let Some(v) = patch.maintenance_mode {
            next.maintenance_mode = v;
        }
        if let Some(v) = patch.registration_enabled {
            next.registration_enabled = v;
        }
        if let Some(v) = patch.reservations_enabled {
            next.reservations_enabled = v;
        }
        next
    }
}

/// Raw backend shape: every field may be missing or `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigurationPayload {
    #[serde(alias = "site_name")]
    site_name: Option<String>,
    description: Option<String>,
    #[serde(alias = "contact_email")]
    contact_email: Option<String>,
    #[serde(alias = "contact_phone")]
    contact_phone: Option<String>,
    #[serde(alias = "max_reservations_per_user", deserialize_with = "deserialize_opt_u32")]
    max_reservations_per_user: Option<u32>,
    #[serde(alias = "cancellation_lead_time_hours", deserialize_with = "deserialize_opt_u32")]
    cancellation_lead_time_hours: Option<u32>,
    #[serde(alias = "maintenance_mode")]
    maintenance_mode: Option<bool>,
    #[serde(alias = "registration_enabled")]
    registration_enabled: Option<bool>,
    #[serde(alias = "reservations_enabled")]
    reservations_enabled: Option<bool>,
}

impl From<ConfigurationPayload> for SystemConfiguration {
    fn from(raw: ConfigurationPayload) -> Self {
        Self {
            site_name: raw.site_name.unwrap_or_else(|| DEFAULT_SITE_NAME.to_owned()),
            description: raw.description.unwrap_or_default(),
            contact_email: raw.contact_email.unwrap_or_default(),
            contact_phone: raw.contact_phone.unwrap_or_default(),
            max_reservations_per_user: raw.max_reservations_per_user.unwrap_or(DEFAULT_MAX_RESERVATIONS_PER_USER),
            cancellation_lead_time_hours: raw
                .cancellation_lead_time_hours
                .unwrap_or(DEFAULT_CANCELLATION_LEAD_TIME_HOURS),
            maintenance_mode: raw.maintenance_mode.unwrap_or(false),
            registration_enabled: raw.registration_enabled.unwrap_or(true),
            reservations_enabled: raw.reservations_enabled.unwrap_or(true),
        }
    }
}

/// Partial update; `None` leaves the current value alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigurationPatch {
    pub site_name: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub max_reservations_per_user: Option<u32>,
    pub cancellation_lead_time_hours: Option<u32>,
    pub maintenance_mode: Option<bool>,
    pub registration_enabled: Option<bool>,
    pub reservations_enabled: Option<bool>,
}

/// Parse a configuration body. Must be a JSON object.
pub fn parse_configuration(body: &str) -> Result<SystemConfiguration, ClientError> {
    let value: serde_json::Value = parse_json(body)?;
    if !value.is_object() {
        return Err(ClientError::Parse("configuration must be a JSON object".to_owned()));
    }
    serde_json::from_value(value).map_err(|e| ClientError::Parse(e.to_string()))
}

// =============================================================================
// LIST ENVELOPE
// =============================================================================

/// Fixed list response schema: `{"data": [...], "total": n}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    #[serde(default, deserialize_with = "deserialize_opt_u32")]
    pub total: Option<u32>,
}

impl<T: DeserializeOwned> ListEnvelope<T> {
    /// Parse a list response body.
    pub fn parse(body: &str) -> Result<Self, ClientError> {
        parse_json(body)
    }

    /// Total row count, falling back to the page length.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.map_or(self.data.len(), |t| t as usize)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `message` then `error` in a JSON object; otherwise uses the raw
/// text. Returns `None` for blank bodies.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return ["message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(serde_json::Value::as_str))
            .map(str::to_owned);
    }
    Some(trimmed.to_owned())
}

fn deserialize_opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) if !s.is_empty() => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(D::Error::custom("expected non-empty string or number id")),
    }
}

fn deserialize_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(number)) => {
            if let Some(int) = number.as_u64() {
                return u32::try_from(int)
                    .map(Some)
                    .map_err(|_| D::Error::custom("number out of range"));
            }
            if number.as_i64().is_some_and(|v| v < 0) {
                return Err(D::Error::custom("expected non-negative integer"));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            if let Some(float) = number.as_f64()
                && float.is_finite()
                && float.fract() == 0.0
                && (0.0..=f64::from(u32::MAX)).contains(&float)
            {
                return Ok(Some(float as u32));
            }
            Err(D::Error::custom("expected non-negative integer"))
        }
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| D::Error::custom("expected non-negative integer string")),
        Some(_) => Err(D::Error::custom("expected number")),
    }
}
