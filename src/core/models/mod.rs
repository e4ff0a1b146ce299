pub mod auth_identity;
pub mod group;
pub mod invitation;
pub mod membership;
pub mod user;

pub use auth_identity::AuthIdentity;
pub use group::Group;
pub use invitation::{Invitation, InvitationStatus};
pub use membership::{Membership, Role};
pub use user::User;
