//! Fixed position labels for the repeating slot groups.
//!
//! Labels are bound to their index and never change; every emitted entry
//! carries its label so filtering empty slots cannot misalign values.

pub const PRIME_TYRE_POSITIONS: [&str; 6] = [
    "Front Left",
    "Front Right",
    "Rear Left Outer",
    "Rear Left Inner",
    "Rear Right Inner",
    "Rear Right Outer",
];

pub const TRAILER_TYRE_POSITIONS: [&str; 12] = [
    "Axle 1 Left Outer",
    "Axle 1 Left Inner",
    "Axle 1 Right Inner",
    "Axle 1 Right Outer",
    "Axle 2 Left Outer",
    "Axle 2 Left Inner",
    "Axle 2 Right Inner",
    "Axle 2 Right Outer",
    "Axle 3 Left Outer",
    "Axle 3 Left Inner",
    "Axle 3 Right Inner",
    "Axle 3 Right Outer",
];

pub const VEHICLE_IMAGE_POSITIONS: [&str; 4] = ["Front", "Left", "Right", "Rear"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotGroup {
    PrimeTyres,
    TrailerTyres,
    VehicleImages,
}

impl SlotGroup {
    pub fn positions(self) -> &'static [&'static str] {
        match self {
            SlotGroup::PrimeTyres => &PRIME_TYRE_POSITIONS,
            SlotGroup::TrailerTyres => &TRAILER_TYRE_POSITIONS,
            SlotGroup::VehicleImages => &VEHICLE_IMAGE_POSITIONS,
        }
    }

    pub fn contains(self, position: &str) -> bool {
        self.positions().contains(&position)
    }

    /// Human-readable group name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            SlotGroup::PrimeTyres => "prime tyre",
            SlotGroup::TrailerTyres => "trailer tyre",
            SlotGroup::VehicleImages => "vehicle image",
        }
    }

    /// Prefix used in blob storage object names.
    pub fn key_prefix(self) -> &'static str {
        match self {
            SlotGroup::PrimeTyres => "prime",
            SlotGroup::TrailerTyres => "trailer",
            SlotGroup::VehicleImages => "vehicle",
        }
    }
}

/// Lowercase, path-safe form of a label: "Rear Left Outer" -> "rear_left_outer".
pub fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
