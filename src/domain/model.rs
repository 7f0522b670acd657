use serde::{Deserialize, Serialize};

/// One FASTA record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    /// Lookup key: uppercase hex MD5 of the uppercased sequence.
    pub fn md5(&self) -> String {
        sequence_md5(&self.sequence)
    }
}

pub fn sequence_md5(sequence: &str) -> String {
    let digest = md5::compute(sequence.to_uppercase().as_bytes());
    format!("{:X}", digest)
}

/// A single precalculated signature hit on a query protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMatch {
    pub protein_id: String,
    pub protein_md5: String,
    pub signature_accession: String,
    pub model_accession: String,
    pub database: String,
    pub database_release: String,
    pub start: u32,
    pub end: u32,
    pub score: Option<f64>,
    pub evalue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
}

/// Ordered slice of the input submitted in one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based position among all batches of a run.
    pub index: usize,
    pub records: Vec<SequenceRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct lookup keys in input order, each paired with the first record
    /// carrying that sequence.
    pub fn distinct_md5s(&self) -> Vec<(String, &SequenceRecord)> {
        let mut seen = std::collections::HashSet::new();
        let mut keys = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let md5 = record.md5();
            if seen.insert(md5.clone()) {
                keys.push((md5, record));
            } else {
                tracing::debug!(
                    "Record '{}' duplicates an earlier sequence in batch {}; sent once",
                    record.id,
                    self.index
                );
            }
        }
        keys
    }
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sequences: usize,
    pub batches: usize,
    pub skipped_batches: usize,
    pub matches_written: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECOLI_SECY: &str = "MAKQPGLDFQSAKGGLGELKRRLLFVIGALIVFRIGSFIPIPGIDAAVLAKLLEQQRGTIIEMFNMFSGGALSRASIFALGIMPYISASIIIQLLTVVHPTLAEIKKEGESGRRKISQYTRYGTLVLAIFQSIGIATGLPNMPGMQGLVINPGFAFYFTAVVSLVTGTMFLMWLGEQITERGIGNGISIIIFAGIVAGLPPAIAHTIEQARQGDLHFLVLLLVAVLVFAVTFFVVFVERGQRRIVVNYAKRQQGRRVYAAQSTHLPLKVNMAGVIPAIFASSIILFPATIASWFGGGTGWNWLTTISLYLQPGQPLYVLLYASAIIFFCFFYTALVFNPRETADNLKKSGAFVPGIRPGEQTAKYIDKVMTRLTLVGALYITFICLIPEFMRDAMKVPFYFGGTSLLIVVVVIMDFMAQVQTLMMSSQYESALKKANLKGYGR";

    #[test]
    fn test_md5_matches_known_uniprot_key() {
        let record = SequenceRecord::new("secY", ECOLI_SECY);
        assert_eq!(record.md5(), "4CD214BD2268CC5AB7F4398B9CBC6CE0");
    }

    #[test]
    fn test_md5_ignores_case_but_not_content() {
        assert_eq!(sequence_md5(ECOLI_SECY), sequence_md5(&ECOLI_SECY.to_lowercase()));
        assert_ne!(sequence_md5(ECOLI_SECY), sequence_md5(&format!("{}X", ECOLI_SECY)));
    }

    #[test]
    fn test_distinct_md5s_keeps_first_occurrence() {
        let batch = Batch {
            index: 1,
            records: vec![
                SequenceRecord::new("a", "MKV"),
                SequenceRecord::new("b", "mkv"),
                SequenceRecord::new("c", "MKL"),
            ],
        };

        let keys = batch.distinct_md5s();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].1.id, "a");
        assert_eq!(keys[1].1.id, "c");
    }

    #[test]
    fn test_domain_match_json_round_trip() {
        let record = DomainMatch {
            protein_id: "secY".to_string(),
            protein_md5: "4CD214BD2268CC5AB7F4398B9CBC6CE0".to_string(),
            signature_accession: "PF00344".to_string(),
            model_accession: "PF00344".to_string(),
            database: "PFAM".to_string(),
            database_release: "33.1".to_string(),
            start: 27,
            end: 370,
            score: Some(251.8),
            evalue: Some(2.8e-56),
            sequence: None,
        };

        let line = serde_json::to_string(&record).unwrap();
        assert!(!line.contains('\n'));
        assert!(!line.contains("\"sequence\""));
        let parsed: DomainMatch = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, record);
    }
}
