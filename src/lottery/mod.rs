pub mod draw;
pub mod prize;
pub mod types;

pub use draw::{DrawGenerator, ScriptedDraws};
pub use prize::{PrizeCalculator, PrizeTier};
pub use types::{Draw, Ticket};
