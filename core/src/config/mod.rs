mod load;
mod types;

pub use load::{
    apply_env_overrides, load_default, load_from, parse_config, parse_duration,
    DEFAULT_CONFIG_FILE,
};
pub use types::*;
