use std::io;
use std::usize::MAX as USIZE_MAX;

pub use self::oracle::{OracleReader, OracleWriter};

mod oracle;
pub mod prelude;

pub trait Read {
    type Item;

    fn read(&mut self, buf: &mut Vec<Self::Item>) -> io::Result<usize> {
        self.read_upto(USIZE_MAX, buf)
    }

    fn read_upto(&mut self, num: usize, buf: &mut Vec<Self::Item>) -> io::Result<usize>;
}

pub trait Write {
    type Item;

    fn write(&mut self, buf: &[Self::Item]) -> io::Result<usize>;

    fn flush(&mut self) -> io::Result<()>;
}

/// Reads up to `num` blocks of non-blank lines, each block ended by a blank line or EOF.
/// `parse` turns one trimmed line into an item.
pub fn read_blocks<R, T, F>(
    reader: &mut R,
    num: usize,
    buf: &mut Vec<Vec<T>>,
    mut parse: F,
) -> io::Result<usize>
where
    R: io::BufRead,
    F: FnMut(&str) -> io::Result<T>,
{
    let mut count = 0;
    let mut line = String::new();
    let mut block = vec![];
    while count < num {
        match reader.read_line(&mut line) {
            Ok(0) => {
                if !block.is_empty() {
                    buf.push(block);
                    count += 1;
                }
                break;
            }
            Ok(_) => {
                let line_trimmed = line.trim();
                if line_trimmed.is_empty() {
                    if !block.is_empty() {
                        buf.push(block);
                        block = vec![];
                        count += 1;
                    }
                } else {
                    block.push(parse(line_trimmed)?);
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
        line.clear();
    }
    Ok(count)
}
