use crate::domain::model::DomainMatch;
use crate::domain::ports::MatchSink;
use crate::utils::error::Result;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes one JSON object per line and flushes after every batch.
pub struct NdjsonWriter<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MatchSink for NdjsonWriter<W> {
    fn write_matches(&mut self, matches: &[DomainMatch]) -> Result<usize> {
        for record in matches {
            serde_json::to_writer(&mut self.writer, record)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        self.written += matches.len();
        Ok(matches.len())
    }
}

/// Stdout when no path is given, otherwise a freshly created file.
pub fn open_output(path: Option<&str>) -> Result<NdjsonWriter<Box<dyn Write>>> {
    let writer: Box<dyn Write> = match path {
        None | Some("-") => Box::new(io::stdout().lock()),
        Some(path) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            Box::new(BufWriter::new(File::create(path)?))
        }
    };
    Ok(NdjsonWriter::new(writer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain_match(protein_id: &str, start: u32) -> DomainMatch {
        DomainMatch {
            protein_id: protein_id.to_string(),
            protein_md5: "BC5A0DFBF35EC22AC2C0F8C1E5534D8E".to_string(),
            signature_accession: "PF00344".to_string(),
            model_accession: "PF00344".to_string(),
            database: "PFAM".to_string(),
            database_release: "33.1".to_string(),
            start,
            end: start + 10,
            score: Some(12.5),
            evalue: None,
            sequence: Some("MKV".to_string()),
        }
    }

    #[test]
    fn test_writes_one_parseable_line_per_match() {
        let mut writer = NdjsonWriter::new(Vec::new());
        let batch = vec![domain_match("a", 1), domain_match("b", 5)];

        assert_eq!(writer.write_matches(&batch).unwrap(), 2);
        assert_eq!(writer.write_matches(&[]).unwrap(), 0);
        assert_eq!(writer.written(), 2);

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(output.ends_with('\n'));

        let parsed: Vec<DomainMatch> = lines
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(parsed, batch);
    }

    #[test]
    fn test_open_output_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/out.ndjson");

        {
            let mut writer = open_output(path.to_str()).unwrap();
            writer.write_matches(&[domain_match("a", 1)]).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
