pub mod entries;
pub mod lifecycle;
pub mod ports;
pub mod rewards;
pub mod scheduler;
pub mod selector;
