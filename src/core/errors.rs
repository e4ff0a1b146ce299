use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LoopMeetError {
    /// Group name is blank after trimming
    #[error("Please provide a group name")]
    InvalidGroupName,

    /// Owner already has a group with the same trimmed name
    #[error("A group with that name already exists for this owner")]
    DuplicateGroupName,

    /// Group with given ID not found
    #[error("Group {0} not found")]
    GroupNotFound(Uuid),

    /// Caller is not the group owner
    #[error("User {0} is not the group owner")]
    NotGroupOwner(Uuid),

    /// Invitation email is blank after trimming
    #[error("Please provide a valid email address")]
    InvalidEmail,

    /// Invited or accepting user already has a membership in the group
    #[error("{0} is already a member of the group")]
    AlreadyMember(String),

    /// A pending invitation already exists for the (group, email) pair
    #[error("An invitation is already pending for {0}")]
    DuplicateInvitation(String),

    /// Invitation missing, not pending, or bound to a different email
    #[error("Invitation {0} not found")]
    InvitationNotFound(Uuid),

    /// No profile stored for the user
    #[error("Profile {0} not found")]
    ProfileNotFound(Uuid),

    /// Bearer token missing, malformed, or failed validation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    /// Catch-all for unexpected errors
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}
