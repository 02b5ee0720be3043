/// Row of the `users` table. Kept separate from the wire types in
/// gemchat-types so the storage layer never leaks credentials into a response.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub created_at: String,
}
