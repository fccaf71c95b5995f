use std::io::Write;

use alsacore::record::InterfaceRecord;

/// Write one block per record, each followed by a blank line.
///
/// Field labels and their order are relied upon by scripts that scrape this output.
pub fn write_report<W: Write>(out: &mut W, records: &[InterfaceRecord]) -> std::io::Result<()> {
    for record in records {
        write!(out, "{record}")?;
        writeln!(out)?;
    }
    out.flush()
}
