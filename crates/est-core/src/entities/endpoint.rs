use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::HttpMethod;
use crate::hours::Hours;

/// An API endpoint the requirement calls for.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: String,
    pub description: String,
    #[schemars(with = "f64")]
    pub estimate_hours: Hours,
}
