mod error;
mod health_check;
mod resolve;
mod search;

pub use health_check::health_check;
pub use resolve::{listen, resolve};
pub use search::search;
