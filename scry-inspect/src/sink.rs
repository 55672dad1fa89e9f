//! Output sinks.
//!
//! The composed output reaches the world one line at a time through
//! this narrow trait; the newline is the sink's responsibility.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub trait Sink {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Default sink: locked stderr.
#[derive(Debug, Default)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let stderr = io::stderr();
        let mut guard = stderr.lock();
        writeln!(guard, "{}", line)
    }
}

/// Collects lines in memory; used for capture and in tests.
#[derive(Debug, Default)]
pub struct VecSink {
    lines: Vec<String>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Sink for VecSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

/// Appends lines to a file, flushing after every line so output
/// survives an abrupt exit of the program being debugged.
#[derive(Debug)]
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    pub fn append<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::options().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Sink for FileSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects_lines() {
        let mut sink = VecSink::new();
        sink.write_line("a").unwrap();
        sink.write_line("b").unwrap();
        assert_eq!(sink.lines(), ["a", "b"]);
    }

    #[test]
    fn test_file_sink_appends() {
        let path = std::env::temp_dir().join("scry-sink-test.log");
        std::fs::remove_file(&path).ok();
        {
            let mut sink = FileSink::create(&path).unwrap();
            sink.write_line("first").unwrap();
        }
        {
            let mut sink = FileSink::append(&path).unwrap();
            sink.write_line("second").unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
        std::fs::remove_file(&path).ok();
    }
}
