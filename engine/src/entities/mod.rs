pub mod aircraft;
pub mod airport;
pub mod order;
pub mod world;
