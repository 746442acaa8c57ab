use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointTag {
    Point,
}

/// GeoJSON point. `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: PointTag,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn from_lat_lng(at: LatLng) -> Self {
        Self {
            kind: PointTag::Point,
            coordinates: [at.lng, at.lat],
        }
    }

    pub fn lng(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn to_lat_lng(&self) -> LatLng {
        LatLng {
            lat: self.lat(),
            lng: self.lng(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing every vertex. `None` for an empty polygon.
    pub fn of_polygon(vertices: &[LatLng]) -> Option<Self> {
        let first = vertices.first()?;
        let mut bounds = Bounds {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        for v in &vertices[1..] {
            bounds.south = bounds.south.min(v.lat);
            bounds.north = bounds.north.max(v.lat);
            bounds.west = bounds.west.min(v.lng);
            bounds.east = bounds.east.max(v.lng);
        }
        Some(bounds)
    }

    pub fn contains(&self, at: LatLng) -> bool {
        at.lat >= self.south && at.lat <= self.north && at.lng >= self.west && at.lng <= self.east
    }
}
