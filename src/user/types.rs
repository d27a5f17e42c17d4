use serde::Deserialize;

/// Request payload for login-less profile resolution
///
/// The frontend sends whatever identity its auth provider produced; the
/// backend gets or creates the matching profile.
#[derive(Debug, Deserialize)]
pub struct UserAuthRequest {
    pub email: String,
    #[serde(default)]
    pub user_image: String,
}

/// Request payload for replacing a user's room membership list
#[derive(Debug, Deserialize)]
pub struct UserRoomsUpdateRequest {
    pub id: String,
    pub rooms: Vec<String>,
}
