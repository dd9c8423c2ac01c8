//! InfluxDB line protocol encoding at second precision.
//!
//! Numbers are always written as floats, without an `i` or `u` suffix.
//!
//! `measurement[,tag=value...] field=value[,field=value...] unix_seconds`

use std::fmt::Write;

use crate::domain::{FieldValue, Point};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EncodeError {
    #[error("measurement name is empty")]
    EmptyMeasurement,
    #[error("point has no fields")]
    NoFields,
}

pub fn encode(point: &Point) -> Result<String, EncodeError> {
    if point.measurement.is_empty() {
        return Err(EncodeError::EmptyMeasurement);
    }
    if point.fields.is_empty() {
        return Err(EncodeError::NoFields);
    }

    let mut line = String::with_capacity(64);
    escape_into(&mut line, &point.measurement, &[',', ' ']);

    // empty tag keys or values are not storable; influx treats them as absent
    for (k, v) in &point.tags {
        if k.is_empty() || v.is_empty() {
            continue;
        }
        line.push(',');
        escape_into(&mut line, k, &[',', '=', ' ']);
        line.push('=');
        escape_into(&mut line, v, &[',', '=', ' ']);
    }

    let mut sep = ' ';
    for (k, v) in &point.fields {
        line.push(sep);
        sep = ',';
        escape_into(&mut line, k, &[',', '=', ' ']);
        line.push('=');
        push_field_value(&mut line, v);
    }

    let _ = write!(line, " {}", point.time.unix_timestamp());
    Ok(line)
}

fn push_field_value(line: &mut String, v: &FieldValue) {
    match v {
        FieldValue::Bool(b) => line.push_str(if *b { "true" } else { "false" }),
        // whole numbers are floats too
        FieldValue::Integer(i) => {
            let _ = write!(line, "{i}");
        }
        FieldValue::Unsigned(u) => {
            let _ = write!(line, "{u}");
        }
        FieldValue::Float(f) => {
            let _ = write!(line, "{f}");
        }
        FieldValue::String(s) => {
            line.push('"');
            for c in s.chars() {
                if c == '"' || c == '\\' {
                    line.push('\\');
                }
                line.push(c);
            }
            line.push('"');
        }
    }
}

fn escape_into(line: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        match c {
            '\n' => line.push_str("\\n"),
            c if special.contains(&c) => {
                line.push('\\');
                line.push(c);
            }
            c => line.push(c),
        }
    }
}
