pub mod capsule;
pub mod ordered_map;
pub mod profile;
pub mod rewards;
