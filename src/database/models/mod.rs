pub mod inventory;
pub mod user;

pub use inventory::{InventoryItem, NewInventoryItem};
pub use user::{NewUser, User, UserView};
