use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Body of `POST /<org>/<bucket>`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WriteRequest {
    #[serde(default)]
    pub measurement: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    /// Unix seconds. Absent or zero means "now".
    #[serde(default)]
    pub ts: Option<i64>,
}

/// A JSON scalar usable as a field value.
///
/// Variant order matters for the untagged representation: integers are tried
/// before floats so `1` stays an integer and `1.5` becomes a float. `Unsigned`
/// only matches values that do not fit in an `i64`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub time: OffsetDateTime,
}

impl WriteRequest {
    /// Builds the point to forward, stamping it with `received_at` when the
    /// request carries no timestamp.
    pub fn into_point(
        self,
        received_at: OffsetDateTime,
    ) -> Result<Point, time::error::ComponentRange> {
        let time = match self.ts {
            None | Some(0) => received_at,
            Some(secs) => OffsetDateTime::from_unix_timestamp(secs)?,
        };
        Ok(Point {
            measurement: self.measurement,
            tags: self.tags,
            fields: self.fields,
            time,
        })
    }
}
