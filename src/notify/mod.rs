/// Report delivery to the chat bot and rate limiting
pub mod rate_limiter;
pub mod telegram;

pub use rate_limiter::RateLimiter;
pub use telegram::TelegramNotifier;
