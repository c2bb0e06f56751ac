use std::fs::File;
use std::io as std_io;
use std::path::Path;
use std::sync::Arc;

use crate::io as mod_io;
use crate::syntax::transition::{Action, System, TransitionSystem};

fn invalid_data<E>(e: E) -> std_io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    std_io::Error::new(std_io::ErrorKind::InvalidData, e)
}

/// Reads oracle files: one action per line, sentences separated by blank lines.
#[derive(Debug)]
pub struct OracleReader<R> {
    inner: R,
    system: Arc<System>,
}

impl<R: std_io::BufRead> OracleReader<R> {
    pub fn new(inner: R, system: Arc<System>) -> Self {
        OracleReader { inner, system }
    }

    #[inline]
    pub fn inner(&self) -> &R {
        &self.inner
    }

    #[inline]
    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl OracleReader<std_io::BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, system: Arc<System>) -> std_io::Result<Self> {
        Ok(Self::new(std_io::BufReader::new(File::open(path)?), system))
    }
}

impl<R: std_io::BufRead> mod_io::Read for OracleReader<R> {
    type Item = Vec<Action>;

    fn read_upto(&mut self, num: usize, buf: &mut Vec<Self::Item>) -> std_io::Result<usize> {
        let system = &self.system;
        mod_io::read_blocks(&mut self.inner, num, buf, |line| {
            system.from_text(line).map_err(invalid_data)
        })
    }
}

/// Writes action sequences in the line format `OracleReader` reads back.
#[derive(Debug)]
pub struct OracleWriter<W> {
    inner: W,
    system: Arc<System>,
}

impl<W: std_io::Write> OracleWriter<W> {
    pub fn new(inner: W, system: Arc<System>) -> Self {
        OracleWriter { inner, system }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_sentence(&mut self, actions: &[Action]) -> std_io::Result<()> {
        for action in actions {
            let line = self.system.to_text(action).map_err(invalid_data)?;
            writeln!(self.inner, "{}", line)?;
        }
        writeln!(self.inner)
    }
}

impl OracleWriter<std_io::BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P, system: Arc<System>) -> std_io::Result<Self> {
        Ok(Self::new(std_io::BufWriter::new(File::create(path)?), system))
    }
}

impl<W: std_io::Write> mod_io::Write for OracleWriter<W> {
    type Item = Vec<Action>;

    fn write(&mut self, buf: &[Self::Item]) -> std_io::Result<usize> {
        for actions in buf {
            self.write_sentence(actions)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std_io::Result<()> {
        self.inner.flush()
    }
}
