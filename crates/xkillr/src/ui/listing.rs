use std::io::{self, Write};

use crate::process::ProcessRecord;
use crate::ui::format_row;

/// Prints the `--list` table.
pub fn write_table<'a, W, I>(out: &mut W, records: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ProcessRecord>,
{
    writeln!(out, "{}", format_row("USER", "PID", "COMMAND"))?;
    for record in records {
        writeln!(
            out,
            "{}",
            format_row(&record.user, &record.pid, &record.command)
        )?;
    }
    out.flush()
}
