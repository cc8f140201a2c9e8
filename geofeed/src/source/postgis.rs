//! PostGIS source configuration.
//!
//! The PostGIS backend is not compiled into this crate. Its configuration is
//! still recognised so that layer validation can tell backends apart, and an
//! implementation can be plugged in through a
//! [`SourceFactory`](crate::layer::SourceFactory).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_port() -> u16 {
    5432
}

fn default_schema() -> String {
    "public".to_string()
}

/// Configuration for a PostGIS-backed layer source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostGisConfig {
    /// Database host name.
    pub host: String,

    /// Database port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Login role.
    pub user: String,

    /// Login password, if the server requires one.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Schema holding the table.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Table to query.
    pub table: String,

    /// Geometry column.
    pub geometry_field: String,

    /// Feature property name → column.
    #[serde(default)]
    pub source_fields: BTreeMap<String, String>,
}
