//! Walks a directory tree, printing every path the handler is invoked
//! with. Usage: `walk <path> [include-glob ...]`.

use std::env;
use std::io::{self, Write};
use std::path::Path;

use pathwalk::handler::{Attrs, Handler, HandlerError};
use pathwalk::WalkBuilder;

struct Printer<W> {
    out: W,
}

impl<W: Write> Handler for Printer<W> {
    fn file(&mut self, path: &Path, _attrs: &Attrs) -> Result<bool, HandlerError> {
        write_path(&mut self.out, path);
        Ok(true)
    }

    fn directory(&mut self, path: &Path, _attrs: &Attrs) -> Result<bool, HandlerError> {
        write_path(&mut self.out, path);
        Ok(true)
    }
}

fn write_path<W: Write>(mut wtr: W, path: &Path) {
    let _ = writeln!(wtr, "{}", path.display());
}

fn main() {
    let mut args = env::args().skip(1);
    let path = args.next().unwrap_or_else(|| ".".to_string());

    let mut builder = WalkBuilder::new(&path);
    for pattern in args {
        builder.add_include(pattern);
    }

    let mut handler = Printer { out: io::BufWriter::new(io::stdout()) };
    builder.build().walk(&mut handler).unwrap();
}
