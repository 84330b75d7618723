//! Fixed color tables for building and amenity overlays.

pub const COLOR_TYPE_B_AVAILABLE: &str = "#FFEB3B";
pub const COLOR_TYPE_A_AVAILABLE: &str = "#2196F3";
pub const COLOR_SOLD: &str = "#F44336";
pub const COLOR_NEUTRAL: &str = "#cccccc";
pub const COLOR_WHITE: &str = "#FFFFFF";

/// Building fill color derived purely from (status, building type).
/// Unmatched combinations fall back to the neutral default.
pub fn building_fill(status: i32, building_type: &str) -> &'static str {
    match (status, building_type) {
        (1 | 2, "type_b") => COLOR_TYPE_B_AVAILABLE,
        (1 | 2, "type_a") => COLOR_TYPE_A_AVAILABLE,
        (3, _) => COLOR_SOLD,
        _ => COLOR_NEUTRAL,
    }
}

/// Amenity marker color by category; unmatched categories render white.
pub fn amenity_color(category: &str) -> &'static str {
    match category {
        "Restaurants" => "#FF9800",
        "Beach" => "#00BCD4",
        "Shopping" => "#8BC34A",
        "Transport" => "#E91E63",
        _ => COLOR_WHITE,
    }
}

/// Parse `#RRGGBB` into normalized RGB. Anything unparsable renders
/// white rather than failing.
pub fn hex_rgb(hex: &str) -> [f32; 3] {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return [1.0, 1.0, 1.0];
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .unwrap_or(1.0)
    };
    [channel(0), channel(2), channel(4)]
}
