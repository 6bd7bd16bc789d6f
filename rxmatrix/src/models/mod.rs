mod interaction;
mod item;
mod pair;

pub use interaction::*;
pub use item::*;
pub use pair::*;
