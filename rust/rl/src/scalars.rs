//! Training curve output, one scalar per tag and step.

use crate::Result;
use chrono::{SecondsFormat, Utc};
use gymnasium::Continous;
use serde::Serialize;
use std::io::Write;

pub trait ScalarWriter {
    fn add_scalar(&mut self, tag: &str, value: Continous, step: usize) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ScalarRecord<'a> {
    tag: &'a str,
    value: Continous,
    step: usize,
    wall_time: String,
}

/// Writes each scalar as a JSON object on its own line.
pub struct JsonLinesWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ScalarWriter for JsonLinesWriter<W> {
    fn add_scalar(&mut self, tag: &str, value: Continous, step: usize) -> Result<()> {
        let record = ScalarRecord {
            tag,
            value,
            step,
            wall_time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")?;

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.out.flush()?)
    }
}

pub struct NullWriter;

impl ScalarWriter for NullWriter {
    fn add_scalar(&mut self, _tag: &str, _value: Continous, _step: usize) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::Value;

    #[test]
    fn writes_one_json_object_per_line() {
        let mut w = JsonLinesWriter::new(Vec::new());
        w.add_scalar("reward", 0.25, 1).unwrap();
        w.add_scalar("reward", 0.85, 2).unwrap();
        w.flush().unwrap();

        let out = String::from_utf8(w.into_inner()).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);

        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["tag"], "reward");
        assert_eq!(second["value"], 0.85);
        assert_eq!(second["step"], 2);
        assert!(DateTime::parse_from_rfc3339(second["wall_time"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn null_writer_accepts_anything() {
        let mut w = NullWriter;

        assert!(w.add_scalar("reward", Continous::NAN, 0).is_ok());
        assert!(w.flush().is_ok());
    }
}
