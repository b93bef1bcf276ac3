pub mod connection;
pub mod flow;
pub mod settings;
pub mod step;

pub use connection::*;
pub use flow::*;
pub use settings::*;
pub use step::*;
