//! Decoding of match-lookup responses.
//!
//! The service answers with XML shaped like:
//!
//! ```xml
//! <kvSequenceEntryXML>
//!   <matches>
//!     <match>
//!       <proteinMD5>4CD214BD2268CC5AB7F4398B9CBC6CE0</proteinMD5>
//!       <hit>PFAM,33.1,PF00344,PF00344,27,370,,189.7,6.1E-56,[],1,322,323,25,371,251.8,2.8E-56</hit>
//!     </match>
//!   </matches>
//! </kvSequenceEntryXML>
//! ```
//!
//! Each `hit` is a comma-separated row whose column layout is owned by the
//! provider. Everything that knows about that layout stays in this module.

use crate::utils::error::{LookupError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Deserialize;

const ROOT_ELEMENT: &[u8] = b"kvSequenceEntryXML";

// Column positions inside a hit row.
const COL_LIBRARY: usize = 0;
const COL_RELEASE: usize = 1;
const COL_SIGNATURE: usize = 2;
const COL_MODEL: usize = 3;
const COL_START: usize = 4;
const COL_END: usize = 5;
const COL_SEQ_SCORE: usize = 7;
const COL_SEQ_EVALUE: usize = 8;
const COL_LOC_SCORE: usize = 15;
const COL_LOC_EVALUE: usize = 16;
const MIN_COLUMNS: usize = COL_END + 1;

#[derive(Debug, Deserialize)]
struct KvSequenceEntryXml {
    #[serde(default)]
    matches: Option<MatchList>,
}

#[derive(Debug, Deserialize)]
struct MatchList {
    #[serde(rename = "match", default)]
    entries: Vec<MatchEntry>,
}

#[derive(Debug, Deserialize)]
struct MatchEntry {
    #[serde(rename = "proteinMD5")]
    protein_md5: String,
    #[serde(rename = "hit", default)]
    hits: Vec<String>,
}

/// All hits returned for one protein.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchGroup {
    pub protein_md5: String,
    pub hits: Vec<LookupHit>,
}

/// One decoded hit row.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupHit {
    pub database: String,
    pub database_release: String,
    pub signature_accession: String,
    pub model_accession: String,
    pub start: u32,
    pub end: u32,
    pub score: Option<f64>,
    pub evalue: Option<f64>,
}

pub fn parse_lookup_response(xml: &str) -> Result<Vec<MatchGroup>> {
    check_root_element(xml)?;

    let document: KvSequenceEntryXml = quick_xml::de::from_str(xml)
        .map_err(|e| LookupError::parse(format!("invalid lookup XML: {}", e)))?;

    let entries = document.matches.map(|m| m.entries).unwrap_or_default();

    entries
        .into_iter()
        .map(|entry| {
            let protein_md5 = entry.protein_md5.trim().to_uppercase();
            if protein_md5.is_empty() {
                return Err(LookupError::parse("match without proteinMD5"));
            }
            let hits = entry
                .hits
                .iter()
                .map(|row| parse_hit(row))
                .collect::<Result<Vec<_>>>()?;
            Ok(MatchGroup { protein_md5, hits })
        })
        .collect()
}

pub fn parse_hit(row: &str) -> Result<LookupHit> {
    let columns: Vec<&str> = row.trim().split(',').map(str::trim).collect();

    if columns.len() < MIN_COLUMNS {
        return Err(LookupError::parse(format!(
            "hit '{}' has {} columns, expected at least {}",
            row,
            columns.len(),
            MIN_COLUMNS
        )));
    }

    let signature_accession = columns[COL_SIGNATURE].to_string();
    if signature_accession.is_empty() {
        return Err(LookupError::parse(format!("hit '{}' has no signature accession", row)));
    }

    let start = parse_position(row, columns[COL_START], "start")?;
    let end = parse_position(row, columns[COL_END], "end")?;

    Ok(LookupHit {
        database: columns[COL_LIBRARY].to_string(),
        database_release: columns[COL_RELEASE].to_string(),
        signature_accession,
        model_accession: columns[COL_MODEL].to_string(),
        start,
        end,
        score: optional_float(&columns, COL_LOC_SCORE).or_else(|| optional_float(&columns, COL_SEQ_SCORE)),
        evalue: optional_float(&columns, COL_LOC_EVALUE)
            .or_else(|| optional_float(&columns, COL_SEQ_EVALUE)),
    })
}

fn check_root_element(xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return if e.name().as_ref() == ROOT_ELEMENT {
                    Ok(())
                } else {
                    Err(LookupError::parse(format!(
                        "unexpected root element <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )))
                };
            }
            Ok(Event::Eof) => return Err(LookupError::parse("empty lookup response")),
            Ok(_) => continue,
            Err(e) => {
                return Err(LookupError::parse(format!(
                    "invalid XML at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        }
    }
}

fn parse_position(row: &str, value: &str, name: &str) -> Result<u32> {
    value.parse::<u32>().map_err(|_| {
        LookupError::parse(format!("hit '{}' has non-integer {} '{}'", row, name, value))
    })
}

fn optional_float(columns: &[&str], index: usize) -> Option<f64> {
    columns
        .get(index)
        .map(|v| v.trim_matches(|c| c == '[' || c == ']'))
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
