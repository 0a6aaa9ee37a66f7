pub mod command;
pub mod component;
pub mod ready;
pub mod router;
