pub mod align;
pub mod config;
pub mod domain;
pub mod error;
pub mod fs_util;
pub mod local;
pub mod mol2;
pub mod output;
pub mod paths;
pub mod remote;
pub mod schema;
pub mod structure;
pub mod table;
