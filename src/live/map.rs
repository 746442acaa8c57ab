use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    live::render::sanitize,
    models::{
        Record, RecordPayload,
        geo::{Bounds, LatLng},
    },
};

pub const DESTROYED_STRUCTURES_TOTAL: u32 = 6_837;
pub const DESTROYED_STRUCTURES_SAMPLE: u32 = 200;
pub const PERMITS_SUBMITTED: u32 = 389;
pub const PERMITS_APPROVED: u32 = 19;
pub const REBUILDS_IN_PROGRESS: u32 = 165;

pub static FIRE_PERIMETER: Lazy<Vec<LatLng>> = Lazy::new(|| {
    vec![
        LatLng { lat: 34.06, lng: -118.55 },
        LatLng { lat: 34.05, lng: -118.55 },
        LatLng { lat: 34.05, lng: -118.53 },
        LatLng { lat: 34.06, lng: -118.53 },
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerId {
    CommunityReports,
    RegisteredContractors,
    DestroyedStructures,
    PermitsIssued,
    WorkInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerIcon {
    Red,
    Green,
    Yellow,
    Blue,
    Orange,
}

impl MarkerIcon {
    pub fn color(&self) -> &'static str {
        match self {
            MarkerIcon::Red => "red",
            MarkerIcon::Green => "green",
            MarkerIcon::Yellow => "yellow",
            MarkerIcon::Blue => "blue",
            MarkerIcon::Orange => "orange",
        }
    }

    pub fn url(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-2x-{}.png",
            self.color()
        )
    }
}

/// A marker positioned by `lat`/`lng` (map order), with popup markup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    pub icon_url: String,
    pub alt: &'static str,
    pub popup: String,
}

fn community_report_popup(record: &Record) -> Option<String> {
    let RecordPayload::Incident(incident) = &record.payload else {
        return None;
    };
    Some(format!(
        "<b>Community Report</b><br>{}<br><small>By: {}</small>",
        sanitize(&incident.description),
        sanitize(&record.username)
    ))
}

fn registered_contractor_popup(record: &Record) -> Option<String> {
    let RecordPayload::Contractor(c) = &record.payload else {
        return None;
    };
    Some(format!(
        "<b>{}</b><br>License: {}",
        sanitize(&c.name),
        sanitize(&c.license)
    ))
}

/// Mirrors the geo-located records of a snapshot onto one marker layer.
/// Each snapshot clears and redraws the whole layer.
pub struct MapLayerAdapter {
    layer: LayerId,
    icon: MarkerIcon,
    alt: &'static str,
    popup: fn(&Record) -> Option<String>,
    markers: Vec<Marker>,
}

impl MapLayerAdapter {
    pub fn community_reports() -> Self {
        Self {
            layer: LayerId::CommunityReports,
            icon: MarkerIcon::Blue,
            alt: "Community Report",
            popup: community_report_popup,
            markers: Vec::new(),
        }
    }

    pub fn registered_contractors() -> Self {
        Self {
            layer: LayerId::RegisteredContractors,
            icon: MarkerIcon::Orange,
            alt: "Registered Contractor",
            popup: registered_contractor_popup,
            markers: Vec::new(),
        }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn apply(&mut self, snapshot: &[Record]) -> &[Marker] {
        self.markers.clear();
        for record in snapshot {
            let Some(point) = record.location() else {
                continue;
            };
            let Some(popup) = (self.popup)(record) else {
                continue;
            };
            self.markers.push(Marker {
                lat: point.lat(),
                lng: point.lng(),
                icon_url: self.icon.url(),
                alt: self.alt,
                popup,
            });
        }
        &self.markers
    }
}

/// Presentation filler placed at random inside the fire perimeter's bounding box.
/// Not derived from any record.
#[derive(Debug, Clone, Serialize)]
pub struct SampleLayer {
    pub layer: LayerId,
    pub title: String,
    pub live: bool,
    pub markers: Vec<Marker>,
}

impl SampleLayer {
    pub fn generate<R: Rng>(
        layer: LayerId,
        title: String,
        count: u32,
        icon: MarkerIcon,
        alt: &'static str,
        popup: impl Fn(u32) -> String,
        bounds: &Bounds,
        rng: &mut R,
    ) -> Self {
        let markers = (0..count)
            .map(|i| Marker {
                lat: bounds.south + rng.random::<f64>() * (bounds.north - bounds.south),
                lng: bounds.west + rng.random::<f64>() * (bounds.east - bounds.west),
                icon_url: icon.url(),
                alt,
                popup: popup(i + 1),
            })
            .collect();
        Self {
            layer,
            title,
            live: false,
            markers,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FirePerimeter {
    pub vertices: Vec<LatLng>,
    pub popup: String,
}

/// Static overlays built once per process and sent to every dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct MapOverlays {
    pub perimeter: FirePerimeter,
    pub samples: Vec<SampleLayer>,
}

impl MapOverlays {
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let vertices = FIRE_PERIMETER.clone();
        let bounds = Bounds::of_polygon(&vertices).unwrap_or(Bounds {
            south: 34.05,
            west: -118.55,
            north: 34.06,
            east: -118.53,
        });

        let samples = vec![
            SampleLayer::generate(
                LayerId::DestroyedStructures,
                format!(
                    "Destroyed Structures ({DESTROYED_STRUCTURES_SAMPLE} of {})",
                    group_thousands(DESTROYED_STRUCTURES_TOTAL)
                ),
                DESTROYED_STRUCTURES_SAMPLE,
                MarkerIcon::Red,
                "Destroyed Structure",
                |n| format!("<b>Destroyed Home #{n}</b><br>Status: Debris cleared."),
                &bounds,
                rng,
            ),
            SampleLayer::generate(
                LayerId::PermitsIssued,
                format!(
                    "Permits Submitted ({PERMITS_SUBMITTED} total, {PERMITS_APPROVED} approved)"
                ),
                PERMITS_APPROVED,
                MarkerIcon::Green,
                "Issued Permit",
                |n| format!("<b>Permit Approved #{n}</b><br>Type: Like-for-like rebuild"),
                &bounds,
                rng,
            ),
            SampleLayer::generate(
                LayerId::WorkInProgress,
                format!("Work in Progress ({REBUILDS_IN_PROGRESS})"),
                REBUILDS_IN_PROGRESS,
                MarkerIcon::Yellow,
                "Work in Progress",
                |n| format!("<b>Rebuild in Progress #{n}</b><br>Started: 2024"),
                &bounds,
                rng,
            ),
        ];

        Self {
            perimeter: FirePerimeter {
                vertices,
                popup: format!(
                    "<b>Pacific Palisades Fire Perimeter</b><br>{} structures destroyed.",
                    group_thousands(DESTROYED_STRUCTURES_TOTAL)
                ),
            },
            samples,
        }
    }
}

fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
