pub mod errors;
pub mod paramfile;
pub mod params;

pub use errors::*;
pub use paramfile::*;
pub use params::*;
