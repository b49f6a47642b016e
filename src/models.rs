pub mod deposits;
pub mod levels;
pub mod platform;
pub mod roulette;
pub mod tasks;
pub mod users;
pub mod withdrawals;
