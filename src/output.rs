use std::io::{self, Write};

use serde::Serialize;

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
        let json = Self::render(value)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }

    pub fn render<T: Serialize + ?Sized>(value: &T) -> io::Result<String> {
        serde_json::to_string_pretty(value).map_err(io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::table::flatten;

    #[test]
    fn tables_render_as_record_arrays() {
        let record = json!({"kinase.name": "ABL1", "kinase.id": 392});
        let table = flatten(&[record.as_object().cloned().unwrap()]).unwrap();
        let rendered = JsonOutput::render(&table).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, json!([{"kinase.name": "ABL1", "kinase.id": 392}]));
    }
}
