pub mod skills;
pub mod wire;
