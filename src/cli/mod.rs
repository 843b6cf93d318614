pub mod capacity;
pub mod embed;
pub mod extract;
pub mod info;

pub use capacity::*;
pub use embed::*;
pub use extract::*;
pub use info::*;
