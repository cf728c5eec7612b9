//! InfluxDB line protocol output
//!
//! `<measurement>[,<tag>=<value>...] <field>=<value>[,...] <timestamp_ns>`

use dwmon_core::{FieldValue, Record};
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::io::{self, Write};

fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

fn escape_measurement(out: &mut String, s: &str) {
    escape_into(out, s, &[',', ' ']);
}

fn escape_key(out: &mut String, s: &str) {
    escape_into(out, s, &[',', '=', ' ']);
}

fn write_field_value(out: &mut String, value: &FieldValue) -> bool {
    match value {
        FieldValue::Integer(v) => {
            let _ = write!(out, "{}i", v);
        }
        // NaN and infinities have no line protocol representation
        FieldValue::Float(v) if !v.is_finite() => return false,
        FieldValue::Float(v) => {
            let _ = write!(out, "{}", v);
        }
        FieldValue::String(v) => {
            out.push('"');
            escape_into(out, v, &['"', '\\']);
            out.push('"');
        }
    }
    true
}

/// Encode one record, `None` when no field is representable
pub fn encode(record: &Record) -> Option<String> {
    let mut line = String::with_capacity(64 + record.fields.len() * 16);
    escape_measurement(&mut line, &record.name);

    if let Some(tags) = &record.tags {
        for (k, v) in tags.iter().filter(|(k, v)| !k.is_empty() && !v.is_empty()) {
            line.push(',');
            escape_key(&mut line, k);
            line.push('=');
            escape_key(&mut line, v);
        }
    }

    let mut written = 0;
    for (key, value) in &record.fields {
        let mark = line.len();
        line.push(if written == 0 { ' ' } else { ',' });
        escape_key(&mut line, key);
        line.push('=');
        if write_field_value(&mut line, value) {
            written += 1;
        } else {
            line.truncate(mark);
        }
    }
    if written == 0 {
        return None;
    }

    let nanos = record.timestamp.timestamp_nanos_opt().unwrap_or_default();
    let _ = write!(line, " {}", nanos);
    Some(line)
}

/// Writes records as line protocol, one line each
pub struct LineOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LineOutput {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Returns whether a line was written
    pub fn write(&self, record: &Record) -> io::Result<bool> {
        let Some(line) = encode(record) else {
            return Ok(false);
        };
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(true)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }
}
