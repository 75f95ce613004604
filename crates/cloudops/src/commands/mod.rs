pub mod budget;
pub mod deploy;
