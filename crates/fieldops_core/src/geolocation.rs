use crate::model::{Coordinates, LocationFix};
use std::fmt;
use std::time::Duration;

pub const FALLBACK_POSITION: Coordinates = Coordinates {
    lat: -6.2088,
    lng: 106.8456,
};
pub const FALLBACK_ERROR_ADDRESS: &str = "Lokasi tidak tersedia (menggunakan default Jakarta)";
pub const FALLBACK_UNSUPPORTED_ADDRESS: &str = "Geolocation tidak didukung browser";

/// Accuracy, timeout and cache policy handed to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    Unsupported,
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl GeolocationError {
    pub fn code(self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::PermissionDenied => "permission_denied",
            Self::PositionUnavailable => "position_unavailable",
            Self::Timeout => "timeout",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "unsupported" => Some(Self::Unsupported),
            "permission_denied" | "denied" => Some(Self::PermissionDenied),
            "position_unavailable" | "unavailable" => Some(Self::PositionUnavailable),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }
}

impl fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub trait GeolocationProvider: Send + Sync {
    fn current_position(&self, options: &PositionOptions)
    -> Result<Coordinates, GeolocationError>;
}

/// A device that always reports the same position.
pub struct FixedPosition(pub Coordinates);

impl GeolocationProvider for FixedPosition {
    fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// A device that fails every request with the same error. `Unsupported`
/// stands for an environment without any geolocation facility.
pub struct FailingPosition(pub GeolocationError);

impl GeolocationProvider for FailingPosition {
    fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError> {
        Err(self.0)
    }
}

/// Turns a provider result into the fix shown on the form. Failures never
/// leave the form without a location.
pub fn resolve_fix(outcome: Result<Coordinates, GeolocationError>) -> LocationFix {
    match outcome {
        Ok(coordinates) => LocationFix {
            lat: coordinates.lat,
            lng: coordinates.lng,
            address: coordinates.display_pair(),
        },
        Err(GeolocationError::Unsupported) => fallback_fix(FALLBACK_UNSUPPORTED_ADDRESS),
        Err(err) => {
            tracing::warn!(error = %err, "geolocation failed, using fallback position");
            fallback_fix(FALLBACK_ERROR_ADDRESS)
        }
    }
}

fn fallback_fix(address: &str) -> LocationFix {
    LocationFix {
        lat: FALLBACK_POSITION.lat,
        lng: FALLBACK_POSITION.lng,
        address: address.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FALLBACK_ERROR_ADDRESS, FALLBACK_UNSUPPORTED_ADDRESS, FailingPosition, FixedPosition,
        GeolocationError, GeolocationProvider, PositionOptions, resolve_fix,
    };
    use crate::model::Coordinates;
    use std::time::Duration;

    #[test]
    fn default_options_request_fresh_high_accuracy_fix() {
        let options = PositionOptions::default();
        assert!(options.enable_high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[test]
    fn success_uses_coordinate_pair_as_address() {
        let provider = FixedPosition(Coordinates::new(-6.175392, 106.827153));
        let fix = resolve_fix(provider.current_position(&PositionOptions::default()));

        assert_eq!(fix.lat, -6.175392);
        assert_eq!(fix.lng, 106.827153);
        assert_eq!(fix.address, "-6.175392, 106.827153");
    }

    #[test]
    fn provider_error_falls_back_to_jakarta() {
        for error in [
            GeolocationError::PermissionDenied,
            GeolocationError::PositionUnavailable,
            GeolocationError::Timeout,
        ] {
            let provider = FailingPosition(error);
            let fix = resolve_fix(provider.current_position(&PositionOptions::default()));

            assert_eq!(fix.lat, -6.2088);
            assert_eq!(fix.lng, 106.8456);
            assert_eq!(fix.address, FALLBACK_ERROR_ADDRESS);
        }
    }

    #[test]
    fn unsupported_environment_has_its_own_fallback_text() {
        let fix = resolve_fix(Err(GeolocationError::Unsupported));

        assert_eq!(fix.lat, -6.2088);
        assert_eq!(fix.lng, 106.8456);
        assert_eq!(fix.address, FALLBACK_UNSUPPORTED_ADDRESS);
    }

    #[test]
    fn parse_accepts_codes_and_short_forms() {
        assert_eq!(
            GeolocationError::parse("permission-denied"),
            Some(GeolocationError::PermissionDenied)
        );
        assert_eq!(GeolocationError::parse(" Timeout "), Some(GeolocationError::Timeout));
        assert_eq!(GeolocationError::parse("gps"), None);
    }
}
