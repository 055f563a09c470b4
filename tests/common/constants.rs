//! Shared constants for end-to-end tests
//!
//! When the fixture collection changes, update only this file and
//! `fixtures.rs`.

// ============================================================================
// Artists
// ============================================================================

/// High energy dance act
pub const PULSE_ID: &str = "artist-pulse";
pub const PULSE_NAME: &str = "Pulse";

/// Slow acoustic ambient act
pub const STILL_WATERS_ID: &str = "artist-still-waters";
pub const STILL_WATERS_NAME: &str = "Still Waters";

/// Mid-tempo instrumental jazz act
pub const BLUE_QUARTET_ID: &str = "artist-blue-quartet";
pub const BLUE_QUARTET_NAME: &str = "Blue Quartet";

// ============================================================================
// Tracks
// ============================================================================

/// Tracks per artist in the fixture collection
pub const TRACKS_PER_ARTIST: usize = 4;

/// Source id the fixture collection is registered under
pub const SOURCE_ID: &str = "liked";

pub const PULSE_TRACK_IDS: [&str; 4] = ["pulse-1", "pulse-2", "pulse-3", "pulse-4"];
pub const STILL_TRACK_IDS: [&str; 4] = ["still-1", "still-2", "still-3", "still-4"];
pub const BLUE_TRACK_IDS: [&str; 4] = ["blue-1", "blue-2", "blue-3", "blue-4"];
