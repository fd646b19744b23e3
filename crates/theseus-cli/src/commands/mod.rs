pub mod describe;
pub mod evolve;
pub mod targets;
