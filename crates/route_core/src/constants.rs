/// Edge weight type, in minutes
pub type Weight = f64;
/// Penalty for a line change without a matching transfer record
pub const DEFAULT_TRANSFER_PENALTY: Weight = 5.0;
/// Travel time for a connection row without its own timing (180 s)
pub const DEFAULT_RIDE_MINUTES: Weight = 3.0;
/// Speed used to turn straight-line distance into minutes
pub const DEFAULT_HEURISTIC_SPEED_KMH: f64 = 90.0;
/// Directional transfer timings further apart than this are flagged
pub const DEFAULT_TRANSFER_ASYMMETRY_SECS: u32 = 60;
pub const EARTH_RADIUS_KM: f64 = 6371.0;
