pub mod db;

mod cli;
pub use cli::*;

mod dates;
pub use dates::*;

mod errors;
pub use errors::*;

mod state;
pub use state::*;

mod utils;
pub use utils::*;

pub mod routes;
