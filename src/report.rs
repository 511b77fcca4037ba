use std::io::{self, Write};

use crate::outcome::BatchResult;

/// `Done. ok=<k> fail=<m> elapsed_ms=<t>`
pub fn summary_line(result: &BatchResult) -> String {
    format!(
        "Done. ok={} fail={} elapsed_ms={}",
        result.ok(),
        result.fail(),
        result.elapsed_ms()
    )
}

/// Write the summary to `out` and one `ERR <message>` line per failure to `err`.
/// Successes are not rendered.
pub fn write_report(result: &BatchResult, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", summary_line(result))?;
    for message in result.errors() {
        writeln!(err, "ERR {message}")?;
    }
    out.flush()?;
    err.flush()
}
