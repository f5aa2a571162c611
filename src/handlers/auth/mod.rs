// handlers/auth/mod.rs - Token acquisition and identity
//
// register and login are public and return a bearer token; whoami needs one.

use serde::Serialize;

use crate::auth::IssuedToken;
use crate::database::UserView;

pub mod login;    // POST /api/users/login
pub mod register; // POST /api/users/register
pub mod whoami;   // GET /api/users/me

pub use login::login_post;
pub use register::register_post;
pub use whoami::whoami_get;

/// Token plus the user it was issued to
#[derive(Debug, Serialize)]
pub struct Session {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: UserView,
}
