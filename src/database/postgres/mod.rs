pub mod entitlements;
pub mod giveaway;
pub mod permissions;
pub mod revocations;
