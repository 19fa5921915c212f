// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Citizen role - can submit reports and track their own
pub const ROLE_CITIZEN: &str = "citizen";

/// Authority role - can triage, assign and resolve any report
pub const ROLE_AUTHORITY: &str = "authority";

// =============================================================================
// REPORTER REWARDS
// =============================================================================

/// Points credited to the reporter for each submitted report
pub const POINTS_PER_REPORT: i32 = 10;

/// Fallback leaderboard name when a user has neither name nor email
pub const ANONYMOUS_NAME: &str = "Anonymous";

// =============================================================================
// UPLOADS
// =============================================================================

/// Maximum photo size (10MB)
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Image types accepted for report photos and resolution evidence
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Check if a MIME type is accepted for photo uploads
pub fn is_image_type_allowed(mime_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&mime_type)
}
