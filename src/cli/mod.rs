//! Command-line interface

pub mod commands;

pub use commands::{
    cmd_compile, cmd_cost, cmd_disasm, cmd_price, cmd_quote, load_asset_configs, load_registry,
    parse_context, CliResult, ServerConfig, DEFAULT_ASSETS_FILE,
};
