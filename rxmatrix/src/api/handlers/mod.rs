mod health;
mod interactions;
mod normalize;

pub use health::health_check;
pub use interactions::interactions;
pub use normalize::normalize;
