use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppError;

/// Subsystem that originated a principal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    /// Wallet-bound admin records kept by the original admin subsystem.
    Legacy,
    /// Records kept by the unified account subsystem.
    Unified,
}

impl IdentitySource {
    /// Returns a stable storage value for this source.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Unified => "unified",
        }
    }

    /// Returns the opposite identity source.
    #[must_use]
    pub fn other(&self) -> Self {
        match self {
            Self::Legacy => Self::Unified,
            Self::Unified => Self::Legacy,
        }
    }
}

impl Display for IdentitySource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for IdentitySource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "legacy" => Ok(Self::Legacy),
            "unified" => Ok(Self::Unified),
            _ => Err(AppError::Validation(format!(
                "unknown identity source '{value}'"
            ))),
        }
    }
}

/// Externally supplied identity currently connected to the admin surface.
///
/// The value is either a wallet address (legacy records) or an account id
/// (unified records). Comparison is exact; callers normalise case upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectedIdentity {
    value: String,
    source: IdentitySource,
}

impl ConnectedIdentity {
    /// Creates a connected identity, rejecting blank values.
    pub fn new(value: impl Into<String>, source: IdentitySource) -> Result<Self, AppError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(AppError::Authentication(
                "connected identity must not be empty".to_owned(),
            ));
        }

        Ok(Self { value, source })
    }

    /// Returns the bound address or account id.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Returns the subsystem that supplied the identity.
    #[must_use]
    pub fn source(&self) -> IdentitySource {
        self.source
    }
}
