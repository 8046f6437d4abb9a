pub mod inventory;
pub mod split;
pub mod status;
