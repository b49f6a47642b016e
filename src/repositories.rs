pub mod deposits;
pub mod levels;
pub mod platform;
pub mod roulette;
pub mod tasks;
pub mod users;
pub mod withdrawals;

/// Domain-level failures raised by the repositories. Everything else that
/// comes out of them is a storage error. Services downcast to decide how a
/// failure surfaces over HTTP.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("phone number is required")]
    PhoneNumberRequired,
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("an active level purchase of the required tier is needed")]
    LevelRequired,
    #[error("a level purchase is already active")]
    ActivePurchaseExists,
    #[error("task already completed today")]
    TaskAlreadyCompletedToday,
    #[error("no roulette spins left")]
    NoSpinsLeft,
    #[error("no roulette prizes configured")]
    NoPrizesConfigured,
    #[error("a withdrawal cannot be reset to pending")]
    InvalidStatusTransition,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} not found or already resolved")]
    AlreadyResolved(&'static str),
}
