// Shared geometry and interaction tuning constants used by the engine
// and the web frontend.

// Scene geometry
pub const PANORAMA_RADIUS: f32 = 500.0; // radius of the textured sphere
pub const AMENITY_RADIUS: f32 = 500.0; // amenity markers sit on the panorama sphere
pub const AMENITY_MARKER_RADIUS: f32 = 8.0;

// Building image hotspots (per-building values override these)
pub const DEFAULT_HOTSPOT_RADIUS: f32 = 65.0;
pub const DEFAULT_HOTSPOT_SIZE: f32 = 50.0;

// Unit/back oval markers
pub const MARKER_RADIUS: f32 = 65.0;
pub const MARKER_SIZE: f32 = 14.0;
pub const UNIT_MARKER_ROLL_DEG: f32 = 118.6; // calibrated against the oval artwork
pub const BACK_MARKER_LATITUDE_DEG: f32 = -5.0;
pub const BACK_MARKER_LONGITUDE_DEG: f32 = -60.0;

// Cross-fade: fixed opacity step per rendered frame (~50 frames per fade)
pub const FADE_STEP: f32 = 0.02;

// Auto-rotation
pub const AUTOROTATE_SPEED: f32 = 0.3;
pub const AUTOROTATE_RESUME_DELAY_SEC: f32 = 2.0;

// Camera
pub const CAMERA_HOME: [f32; 3] = [0.6, 0.3, 0.1];
pub const FOV_DEFAULT_DEG: f32 = 75.0;
pub const FOV_MIN_DEG: f32 = 30.0;
pub const FOV_MAX_DEG: f32 = 90.0;
pub const WHEEL_ZOOM_SPEED: f32 = 6.0;

// Overlay opacity states
pub const OVERLAY_REST_OPACITY: f32 = 0.4;
pub const OVERLAY_HOVER_OPACITY: f32 = 0.2;
pub const AMENITY_OPACITY: f32 = 0.85;
