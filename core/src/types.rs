//! Shared primitive types used across the attribution engine.

/// A marketing channel identifier, e.g. "Digital Ads" or "Push".
pub type ChannelId = String;

/// A stable identifier for the user owning a journey.
pub type UserId = String;

/// Relative tolerance used when checking that credits conserve value.
pub const CREDIT_TOLERANCE: f64 = 1e-9;

/// Separator between channels when a path is rendered as text.
pub const PATH_SEPARATOR: &str = " → ";

/// Path label for journeys that convert with no prior touchpoint.
pub const DIRECT_PATH: &str = "Direct";
