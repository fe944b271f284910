use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde::Serialize;
use tracing::debug;

use crate::engine::{ContractAnalysis, ContractMetrics, ContractRecord};
use crate::model::StoreSummary;
use crate::util::{ensure_directory, now_utc_string};

const DB_SCHEMA_VERSION: &str = "0.1.0";

mod analytics;
mod db_setup;
mod persist;
mod summary;
#[cfg(test)]
mod tests;

pub use self::analytics::*;
pub use self::db_setup::*;
pub use self::persist::*;
pub use self::summary::*;
