pub mod health;
pub mod likes;
pub mod members;
pub mod photos;
pub mod profile;
