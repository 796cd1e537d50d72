//! Great-circle distance and circular geofences.
//!
//! Distances use the haversine formula on a spherical Earth of mean
//! radius [`EARTH_RADIUS_METERS`].

use serde::{Deserialize, Serialize};

use crate::error::{UpasthitiError, UpasthitiResult};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points given in degrees.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reject NaN/infinite values and coordinates outside the valid
    /// latitude/longitude ranges.
    pub fn validate(&self) -> UpasthitiResult<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(UpasthitiError::validation(format!(
                "latitude out of range: {}",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(UpasthitiError::validation(format!(
                "longitude out of range: {}",
                self.lng
            )));
        }
        Ok(())
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_meters(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Circular region a scan must originate from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    pub lat: f64,
    pub lng: f64,
    pub radius_meters: f64,
}

impl Geofence {
    /// Build a geofence, rejecting invalid centers and non-positive radii.
    pub fn new(lat: f64, lng: f64, radius_meters: f64) -> UpasthitiResult<Self> {
        let fence = Self {
            lat,
            lng,
            radius_meters,
        };
        fence.validate()?;
        Ok(fence)
    }

    pub fn validate(&self) -> UpasthitiResult<()> {
        self.center().validate()?;
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(UpasthitiError::validation(format!(
                "geofence radius must be positive, got {}",
                self.radius_meters
            )));
        }
        Ok(())
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Distance of `point` from the center, in meters.
    pub fn distance_from_center(&self, point: &GeoPoint) -> f64 {
        self.center().distance_to(point)
    }

    /// Check `point` against the fence.
    ///
    /// Returns the measured distance on success so callers can log it.
    /// A point exactly on the boundary is inside.
    pub fn check(&self, point: &GeoPoint) -> UpasthitiResult<f64> {
        let distance = self.distance_from_center(point);
        if distance > self.radius_meters {
            return Err(UpasthitiError::OutOfRange {
                distance_meters: distance,
                radius_meters: self.radius_meters,
            });
        }
        Ok(distance)
    }
}
