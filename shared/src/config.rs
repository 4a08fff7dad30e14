//! Injected configuration: the three direct-dial numbers, the SOS endpoint,
//! and the bounded timeouts for location and dispatch.
//!
//! The shell hands the core raw JSON; everything is validated here so the
//! rest of the core only ever sees well-formed values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::Endpoint;
use crate::error::{ConfigError, ValidationError};
use crate::model::ClientContext;
use crate::{
    DEFAULT_DISPATCH_TIMEOUT_MS, DEFAULT_EMERGENCY_NUMBER, DEFAULT_LOCATION_TIMEOUT_MS,
    DEFAULT_SOS_ENDPOINT, MAX_DISPATCH_TIMEOUT_MS, MAX_LOCATION_TIMEOUT_MS,
};

const MAX_PHONE_NUMBER_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyService {
    Police,
    Ambulance,
    Fire,
}

impl EmergencyService {
    pub const ALL: [Self; 3] = [Self::Police, Self::Ambulance, Self::Fire];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Police => "Police",
            Self::Ambulance => "Ambulance",
            Self::Fire => "Fire Dept",
        }
    }
}

impl fmt::Display for EmergencyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(number: impl Into<String>) -> Result<Self, ValidationError> {
        let number = number.into().trim().to_string();
        let invalid = |reason: &str| ValidationError::InvalidPhoneNumber {
            number: number.clone(),
            reason: reason.to_string(),
        };

        if number.is_empty() {
            return Err(invalid("cannot be empty"));
        }
        if number.len() > MAX_PHONE_NUMBER_LENGTH {
            return Err(invalid("too long"));
        }
        if let Some(c) = number
            .chars()
            .find(|c| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '*' | '#' | ' ')))
        {
            return Err(invalid(&format!("invalid character '{c}'")));
        }
        if !number.chars().any(|c| c.is_ascii_digit()) {
            return Err(invalid("must contain at least one digit"));
        }
        Ok(Self(number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `tel:` URI with spaces stripped.
    #[must_use]
    pub fn tel_uri(&self) -> String {
        let digits: String = self.0.chars().filter(|c| !c.is_whitespace()).collect();
        format!("tel:{digits}")
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SosConfig {
    police: PhoneNumber,
    ambulance: PhoneNumber,
    fire: PhoneNumber,
    sos_endpoint: Endpoint,
    location_timeout_ms: u64,
    dispatch_timeout_ms: u64,
    client_context: ClientContext,
}

/// Wire form of the config as the shell provides it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawConfig {
    police: String,
    ambulance: String,
    fire: String,
    sos_endpoint: String,
    location_timeout_ms: u64,
    dispatch_timeout_ms: u64,
    client_context: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            police: DEFAULT_EMERGENCY_NUMBER.into(),
            ambulance: DEFAULT_EMERGENCY_NUMBER.into(),
            fire: DEFAULT_EMERGENCY_NUMBER.into(),
            sos_endpoint: DEFAULT_SOS_ENDPOINT.into(),
            location_timeout_ms: DEFAULT_LOCATION_TIMEOUT_MS,
            dispatch_timeout_ms: DEFAULT_DISPATCH_TIMEOUT_MS,
            client_context: ClientContext::unknown().as_str().into(),
        }
    }
}

fn check_range(field: &'static str, value: u64, max: u64) -> Result<u64, ValidationError> {
    if value == 0 || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: 1,
            max,
        });
    }
    Ok(value)
}

impl TryFrom<RawConfig> for SosConfig {
    type Error = ValidationError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let sos_endpoint =
            Endpoint::parse(raw.sos_endpoint.as_str()).map_err(|e| ValidationError::InvalidEndpoint {
                url: raw.sos_endpoint.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            police: PhoneNumber::new(raw.police)?,
            ambulance: PhoneNumber::new(raw.ambulance)?,
            fire: PhoneNumber::new(raw.fire)?,
            sos_endpoint,
            location_timeout_ms: check_range(
                "locationTimeoutMs",
                raw.location_timeout_ms,
                MAX_LOCATION_TIMEOUT_MS,
            )?,
            dispatch_timeout_ms: check_range(
                "dispatchTimeoutMs",
                raw.dispatch_timeout_ms,
                MAX_DISPATCH_TIMEOUT_MS,
            )?,
            client_context: ClientContext::new(raw.client_context)?,
        })
    }
}

impl Default for SosConfig {
    fn default() -> Self {
        let default_number = || PhoneNumber(DEFAULT_EMERGENCY_NUMBER.to_string());
        Self {
            police: default_number(),
            ambulance: default_number(),
            fire: default_number(),
            sos_endpoint: Endpoint::default(),
            location_timeout_ms: DEFAULT_LOCATION_TIMEOUT_MS,
            dispatch_timeout_ms: DEFAULT_DISPATCH_TIMEOUT_MS,
            client_context: ClientContext::unknown(),
        }
    }
}

impl SosConfig {
    /// Parses and validates the shell-provided JSON. Missing keys fall back
    /// to defaults; unknown keys are ignored; any invalid value rejects the
    /// whole document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Ok(Self::try_from(raw)?)
    }

    pub fn number_for(&self, service: EmergencyService) -> &PhoneNumber {
        match service {
            EmergencyService::Police => &self.police,
            EmergencyService::Ambulance => &self.ambulance,
            EmergencyService::Fire => &self.fire,
        }
    }

    pub fn sos_endpoint(&self) -> &Endpoint {
        &self.sos_endpoint
    }

    pub fn location_timeout_ms(&self) -> u64 {
        self.location_timeout_ms
    }

    pub fn dispatch_timeout_ms(&self) -> u64 {
        self.dispatch_timeout_ms
    }

    pub fn client_context(&self) -> &ClientContext {
        &self.client_context
    }
}
