//! Minimal RFC 4180 writer for the availability tables.

use std::io::{self, Write};

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

pub fn write_row<W: Write>(mut w: W, row: &[&str]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            w.write_all(b",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\n")
}

pub fn to_csv_string(header: &[&str], rows: &[Vec<&str>]) -> String {
    let mut buf = Vec::new();
    // Writes into a Vec cannot fail.
    let _ = write_row(&mut buf, header);
    for row in rows {
        let _ = write_row(&mut buf, row);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
