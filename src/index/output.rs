// file: src/index/output.rs
// description: decoder for recollq field-list output (-F), one base64 field per column
// reference: https://www.recoll.org/manpages/recollq.1.html

use super::{NativeRecord, QueryOutcome};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

pub struct RecollOutputParser<'a> {
    fields: &'a [&'a str],
}

impl<'a> RecollOutputParser<'a> {
    pub fn new(fields: &'a [&'a str]) -> Self {
        Self { fields }
    }

    /// Decodes engine output, stopping once `limit` records were produced.
    pub fn parse(&self, output: &str, limit: usize) -> QueryOutcome {
        let mut outcome = QueryOutcome::default();

        for line in output.lines() {
            if outcome.records.len() >= limit {
                break;
            }

            if line.starts_with("Recoll query:") || line.trim().is_empty() {
                continue;
            }

            if outcome.total.is_none()
                && let Some(total) = Self::parse_total(line)
            {
                outcome.total = Some(total);
                continue;
            }

            match self.parse_record(line) {
                Some(record) => outcome.records.push(record),
                None => debug!("Skipping unrecognised engine output line: {}", line),
            }
        }

        outcome
    }

    /// Reads the `<count> results` header line.
    pub fn parse_total(line: &str) -> Option<u64> {
        let mut words = line.split_whitespace();
        let count = words.next()?.parse::<u64>().ok()?;
        words
            .next()
            .filter(|word| word.starts_with("result"))
            .map(|_| count)
    }

    pub fn parse_record(&self, line: &str) -> Option<NativeRecord> {
        let mut values: Vec<&str> = line.split(' ').collect();

        // Some engine versions terminate each value with a space.
        if values.len() == self.fields.len() + 1 && values.last() == Some(&"") {
            values.pop();
        }

        if values.len() != self.fields.len() {
            return None;
        }

        let mut record = NativeRecord::new();
        for (name, encoded) in self.fields.iter().zip(values) {
            let decoded = STANDARD.decode(encoded).ok()?;
            record.insert(name, String::from_utf8_lossy(&decoded).into_owned());
        }
        Some(record)
    }
}
