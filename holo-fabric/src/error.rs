//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

use crate::config::ConfigError;
use crate::fabric::DeviceId;
use crate::southbound::RuleKind;

// Routing handler errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    // Device configuration
    Config(ConfigError),
    // Rule writer
    RuleInstall(RuleKind, DeviceId, DeviceId),
    RuleRevoke(RuleKind),
    // Snapshot handling
    SnapshotStale(DeviceId),
    GraphMissing(DeviceId),
}

// ===== impl Error =====

impl Error {
    pub(crate) fn log(&self) {
        match self {
            Error::Config(error) => {
                warn!(error = %error, "{}", self);
            }
            Error::RuleInstall(kind, target, dest) => {
                warn!(%kind, %target, %dest, "{}", self);
            }
            Error::RuleRevoke(kind) => {
                warn!(%kind, "{}", self);
            }
            Error::SnapshotStale(device) => {
                warn!(%device, "{}", self);
            }
            Error::GraphMissing(device) => {
                warn!(%device, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(..) => {
                write!(f, "failed to resolve device configuration")
            }
            Error::RuleInstall(..) => {
                write!(f, "failed to install rule")
            }
            Error::RuleRevoke(..) => {
                write!(f, "failed to revoke rule")
            }
            Error::SnapshotStale(..) => {
                write!(
                    f,
                    "no ECMP graph snapshot for incremental rerouting"
                )
            }
            Error::GraphMissing(..) => {
                write!(f, "ECMP shortest path graph not found")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Error {
        Error::Config(error)
    }
}
