//! Input validation for permission checks.
//!
//! Every check validates its inputs before touching any collaborator, so a
//! malformed request costs zero remote calls.

use crate::error::{Result, ValidationError};
use crate::query::PermissionQuery;
use crate::types::{ChannelId, GroupId, LessonAttemptId, UserId};

/// Validate a permission query.
///
/// This performs:
/// - Non-empty user check
/// - Non-zero channel check
///
/// The plan is optional and needs no validation: the zero sentinel has
/// already been folded into `None`.
pub fn validate_query(query: &PermissionQuery) -> Result<()> {
    validate_user(&query.user_id)?;
    validate_channel(query.channel_id)?;
    Ok(())
}

/// Reject an empty user ID.
pub fn validate_user(user_id: &UserId) -> Result<()> {
    if user_id.is_empty() {
        return Err(ValidationError::EmptyUserId);
    }
    Ok(())
}

/// Reject the zero channel ID.
pub fn validate_channel(channel_id: ChannelId) -> Result<()> {
    if channel_id.is_zero() {
        return Err(ValidationError::ZeroChannelId);
    }
    Ok(())
}

/// Reject the zero lesson attempt ID.
pub fn validate_attempt(attempt_id: LessonAttemptId) -> Result<()> {
    if attempt_id.is_zero() {
        return Err(ValidationError::ZeroAttemptId);
    }
    Ok(())
}

/// Reject an empty group ID.
pub fn validate_group(group_id: &GroupId) -> Result<()> {
    if group_id.is_empty() {
        return Err(ValidationError::EmptyGroupId);
    }
    Ok(())
}
