//! Canonical text output.

use std::fmt;
use std::io::{self, Write};

use crate::Document;

/// Writes every group as a `[name]` header followed by its items, one blank line between groups.
pub fn write<W: Write>(writer: &mut W, document: &Document) -> io::Result<()> {
    write!(writer, "{document}")
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            writeln!(f, "[{}]", group.name())?;

            for item in group.items() {
                if item.is_quoted() {
                    writeln!(f, "{} = \"{}\"", item.key(), item.value())?;
                } else {
                    writeln!(f, "{} = {}", item.key(), item.value())?;
                }
            }
        }

        Ok(())
    }
}
