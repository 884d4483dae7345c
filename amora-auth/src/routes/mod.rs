pub mod complete_profile;
pub mod forgot_password;
pub mod health;
pub mod login;
pub mod logout;
pub mod me;
pub mod oauth;
pub mod realtime_auth;
pub mod refresh;
pub mod register;
pub mod reset_password;
pub mod verify_email;
