pub mod assignment;
pub mod attendance;
pub mod catalog;
pub mod class_session;
pub mod enrollment;
pub mod face;
pub mod notification;
pub mod role;
pub mod room;
pub mod user;
