use crate::game::AgentId;

/// Per-agent colours, cycled when there are more agents than entries
pub const AGENT_RGB: [[u8; 3]; 8] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [23, 190, 207],
];

pub const WALL_RGB: [u8; 3] = [64, 64, 64];
pub const BACKGROUND_RGB: [u8; 3] = [255, 255, 255];
pub const GRID_LINE_RGB: [u8; 3] = [200, 200, 200];

pub fn agent_rgb(id: AgentId) -> [u8; 3] {
    AGENT_RGB[id % AGENT_RGB.len()]
}

/// Mix `rgb` towards white, keeping `strength` of the colour
pub fn tint(rgb: [u8; 3], strength: f32) -> [u8; 3] {
    rgb.map(|c| (255.0 - (255.0 - c as f32) * strength).round().clamp(0.0, 255.0) as u8)
}

/// Scale `rgb` towards black
pub fn shade(rgb: [u8; 3], factor: f32) -> [u8; 3] {
    rgb.map(|c| (c as f32 * factor).round().clamp(0.0, 255.0) as u8)
}
