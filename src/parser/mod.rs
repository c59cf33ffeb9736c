//! Parsing of page parameters and IFF85 containers.

mod iff;
mod params;

pub use iff::{parse_container, read_container, IFF_MAGIC};
pub use params::{parse_params, parse_params_with_mode, ParamMode};
