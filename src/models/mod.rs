pub mod analysis;
pub mod response;
pub mod stock;

pub use analysis::*;
pub use response::*;
pub use stock::*;
