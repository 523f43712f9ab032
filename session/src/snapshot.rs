//! Save and load support for a whole session.
//!
//! A [`SessionSnapshot`] is stored as JSON by the persistence layer, or
//! exchanged as a single-line transfer code of the form
//! `rampart:v1:<base64 json>`.

use std::fmt;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rampart_core::{PowerUpSnapshot, ProgressionSnapshot, UpgradeLedgerSnapshot};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::GameSession;

const TRANSFER_DOMAIN: &str = "rampart";
const TRANSFER_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Persisted state of every progression system in a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSnapshot {
    /// Level and experience state.
    pub progression: ProgressionSnapshot,
    /// Purchased upgrade levels.
    pub upgrades: UpgradeLedgerSnapshot,
    /// Power-up registry state.
    pub power_ups: PowerUpSnapshot,
}

impl SessionSnapshot {
    /// Encodes the snapshot as JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::InvalidPayload)
    }

    /// Decodes a snapshot from JSON.
    pub fn from_json(value: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(value).map_err(SnapshotError::InvalidPayload)
    }

    /// Encodes the snapshot into a single line suitable for clipboard transfer.
    pub fn to_transfer_code(&self) -> Result<String, SnapshotError> {
        let json = serde_json::to_vec(self).map_err(SnapshotError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{TRANSFER_DOMAIN}:{TRANSFER_VERSION}:{encoded}"))
    }

    /// Decodes a snapshot from a transfer code.
    pub fn from_transfer_code(value: &str) -> Result<Self, SnapshotError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SnapshotError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().ok_or(SnapshotError::MissingPrefix)?;
        let version = parts.next().ok_or(SnapshotError::MissingVersion)?;
        let payload = parts.next().ok_or(SnapshotError::MissingPayload)?;

        if domain != TRANSFER_DOMAIN {
            return Err(SnapshotError::InvalidPrefix(domain.to_owned()));
        }
        if version != TRANSFER_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(SnapshotError::InvalidEncoding)?;
        serde_json::from_slice(&bytes).map_err(SnapshotError::InvalidPayload)
    }

    /// Decodes either a JSON document or a transfer code.
    pub fn decode(value: &str) -> Result<Self, SnapshotError> {
        if value.trim_start().starts_with('{') {
            Self::from_json(value)
        } else {
            Self::from_transfer_code(value)
        }
    }
}

/// Captures the persisted state of every system in the session.
#[must_use]
pub fn capture(session: &GameSession) -> SessionSnapshot {
    SessionSnapshot {
        progression: session.progression.state(),
        upgrades: session.upgrades.state(),
        power_ups: session.power_ups.state(),
    }
}

/// Restores every system in the session from `snapshot`.
///
/// Out-of-range values are clamped by the owning systems rather than
/// rejected, so any decodable snapshot can be loaded.
pub fn restore(session: &mut GameSession, snapshot: &SessionSnapshot) {
    session.progression.set_state(&snapshot.progression);
    session.upgrades.set_state(&snapshot.upgrades);
    session.power_ups.set_state(&snapshot.power_ups);
    info!(
        level = session.progression.level(),
        active_power_ups = snapshot.power_ups.active_power_ups.len(),
        "session restored"
    );
}

/// Errors that can occur while decoding snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot is empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("snapshot is missing its prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("snapshot is missing its version")]
    MissingVersion,
    /// The payload segment was missing.
    #[error("snapshot is missing its payload")]
    MissingPayload,
    /// The prefix segment did not name this format.
    #[error("snapshot prefix `{0}` is not `rampart`")]
    InvalidPrefix(String),
    /// The version segment named an unsupported version.
    #[error("snapshot version `{0}` is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("snapshot payload is not valid base64: {0}")]
    InvalidEncoding(base64::DecodeError),
    /// The JSON payload could not be encoded or decoded.
    #[error("snapshot payload is not valid: {0}")]
    InvalidPayload(serde_json::Error),
}

impl SnapshotError {
    /// Short machine-readable name of the failure.
    #[must_use]
    pub const fn kind(&self) -> SnapshotErrorKind {
        match self {
            Self::EmptyPayload
            | Self::MissingPrefix
            | Self::MissingVersion
            | Self::MissingPayload => SnapshotErrorKind::Truncated,
            Self::InvalidPrefix(_) | Self::UnsupportedVersion(_) => SnapshotErrorKind::Foreign,
            Self::InvalidEncoding(_) | Self::InvalidPayload(_) => SnapshotErrorKind::Corrupted,
        }
    }
}

/// Coarse classification of snapshot failures for adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotErrorKind {
    /// A required segment is missing.
    Truncated,
    /// The snapshot belongs to another format or version.
    Foreign,
    /// The snapshot is damaged.
    Corrupted,
}

impl fmt::Display for SnapshotErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Truncated => "truncated",
            Self::Foreign => "foreign",
            Self::Corrupted => "corrupted",
        };
        f.write_str(label)
    }
}
