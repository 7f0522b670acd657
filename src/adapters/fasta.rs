use crate::domain::model::SequenceRecord;
use crate::utils::error::{LookupError, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

/// Lazy FASTA parser. Yields one record per `>` header.
///
/// The identifier is the first whitespace-delimited token of the header.
/// Sequence lines are concatenated with whitespace removed; no other cleanup
/// is done, so a trailing `*` stays part of the sequence.
pub struct FastaReader<R: BufRead> {
    lines: Lines<R>,
    line_number: usize,
    pending_header: Option<(usize, String)>,
    seen_ids: HashSet<String>,
    finished: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            pending_header: None,
            seen_ids: HashSet::new(),
            finished: false,
        }
    }

    fn next_record(&mut self) -> Result<Option<SequenceRecord>> {
        let (header_line, header) = match self.pending_header.take() {
            Some(h) => h,
            None => match self.find_first_header()? {
                Some(h) => h,
                None => return Ok(None),
            },
        };

        let id = header
            .trim_start_matches('>')
            .split_whitespace()
            .next()
            .ok_or_else(|| LookupError::format(header_line, "header has no identifier"))?
            .to_string();

        let mut sequence = String::new();
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line.map_err(|e| line_error(self.line_number, e))?;
            if line.starts_with('>') {
                self.pending_header = Some((self.line_number, line));
                break;
            }
            sequence.extend(line.chars().filter(|c| !c.is_whitespace()));
        }

        if sequence.is_empty() {
            return Err(LookupError::format(
                header_line,
                format!("record '{}' has an empty sequence", id),
            ));
        }

        if !self.seen_ids.insert(id.clone()) {
            return Err(LookupError::format(
                header_line,
                format!("identifier '{}' appears more than once", id),
            ));
        }

        Ok(Some(SequenceRecord { id, sequence }))
    }

    fn find_first_header(&mut self) -> Result<Option<(usize, String)>> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line.map_err(|e| line_error(self.line_number, e))?;
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with('>') {
                return Ok(Some((self.line_number, line)));
            }
            return Err(LookupError::format(
                self.line_number,
                "sequence data before the first '>' header",
            ));
        }
        Ok(None)
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

// Undecodable bytes are malformed input, not an IO failure.
fn line_error(line: usize, e: io::Error) -> LookupError {
    if e.kind() == io::ErrorKind::InvalidData {
        LookupError::format(line, "line is not valid UTF-8")
    } else {
        e.into()
    }
}

/// Read and validate a whole FASTA file up front.
pub fn read_fasta_file<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>> {
    let file = File::open(path.as_ref())?;
    let records = FastaReader::new(BufReader::new(file)).collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        "Read {} sequences from {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn parse(input: &str) -> Result<Vec<SequenceRecord>> {
        FastaReader::new(Cursor::new(input)).collect()
    }

    #[test]
    fn test_parses_multiline_records() {
        let records = parse(">sp|P0AGA2|SECY_ECOLI Protein translocase\nMAKQ\nPGLD\n\n>b desc\nMFKT*\n").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "sp|P0AGA2|SECY_ECOLI");
        assert_eq!(records[0].sequence, "MAKQPGLD");
        assert_eq!(records[1].id, "b");
        assert_eq!(records[1].sequence, "MFKT*");
    }

    #[test]
    fn test_leading_blank_lines_and_crlf() {
        let records = parse("\n\n>a\r\nMKV\r\nLL\r\n").unwrap();
        assert_eq!(records, vec![SequenceRecord::new("a", "MKVLL")]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_empty_sequence_is_format_error() {
        let err = parse(">a\nMKV\n>b\n>c\nMKL\n").unwrap_err();
        match err {
            LookupError::FormatError { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("'b'"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_identifier_is_format_error() {
        assert!(matches!(
            parse(">  \nMKV\n"),
            Err(LookupError::FormatError { line: 1, .. })
        ));
    }

    #[test]
    fn test_data_before_header_is_format_error() {
        assert!(matches!(
            parse("MKV\n>a\nMKV\n"),
            Err(LookupError::FormatError { line: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_identifier_is_format_error() {
        assert!(matches!(
            parse(">a\nMKV\n>a\nMKL\n"),
            Err(LookupError::FormatError { line: 3, .. })
        ));
    }

    #[test]
    fn test_reader_is_lazy_and_stops_after_error() {
        let mut reader = FastaReader::new(Cursor::new(">a\nMKV\n>b\n"));
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_invalid_utf8_is_format_error() {
        let input = vec![b'>', b'a', b'\n', b'M', 0xff, 0xfe, b'\n'];
        let err = FastaReader::new(Cursor::new(input))
            .collect::<Result<Vec<_>>>()
            .unwrap_err();

        assert!(matches!(err, LookupError::FormatError { line: 2, .. }));
        assert_eq!(err.exit_code(), 1);

        let err = FastaReader::new(Cursor::new(vec![0xc3, 0x28, b'\n']))
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert!(matches!(err, LookupError::FormatError { line: 1, .. }));
    }

    #[test]
    fn test_read_fasta_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ">one\nMKV\n>two\nMKL").unwrap();

        let records = read_fasta_file(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sequence, "MKL");
    }
}
