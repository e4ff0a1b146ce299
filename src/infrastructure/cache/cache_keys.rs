use uuid::Uuid;

pub fn groups_key(user_id: Uuid) -> String {
    format!("groups:{}", user_id)
}

pub fn group_detail_key(group_id: Uuid) -> String {
    format!("group-detail:{}", group_id)
}

pub fn pending_invitations_key(email: &str) -> String {
    format!("pending-invitations:{}", email)
}
