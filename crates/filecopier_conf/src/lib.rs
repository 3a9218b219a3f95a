//! `filecopier_conf` v1:
//! TOML configuration for copy groups.
//!
//! Every top-level table is one group, except the reserved `Global` table
//! (matched case-insensitively) which carries the default destination and
//! the date-root switch. Groups keep their document order.
//!
//! Modules:
//! - `spec` : raw records, typed config, errors
//! - `load` : file location, reading, parsing

pub mod load;
pub mod spec;

pub use load::{executable_dir, load_config, parse_config, resolve_config_path};
pub use spec::{
    C_CONFIG_FILE_NAME, C_GLOBAL_SECTION, ConfError, EnumListValue, SpecConfig,
    SpecGlobalRecord, SpecGroupRecord,
};
