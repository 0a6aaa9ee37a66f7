pub mod discord;
pub mod duration;
pub mod logging;
pub mod options;
pub mod reply;
