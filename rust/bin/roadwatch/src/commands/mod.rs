pub mod context;
pub mod forward;
pub mod login;
pub mod resource;
pub mod watch;
