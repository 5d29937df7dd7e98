// handlers/public/mod.rs - Public handlers (no session required)
//
// Banner, health check, the login pages, and the login/logout endpoints that issue and
// revoke the session cookie.
pub mod login;
pub mod root;

pub use login::{hod_login, hod_login_page, logout, teacher_login, teacher_login_page};
pub use root::{health, root};
