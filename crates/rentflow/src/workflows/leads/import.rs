use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::domain::LeadInvite;

/// Parse a lead export with `name,email,phone,source` headers.
///
/// Rows without an e-mail are skipped and counted; column order does not matter.
pub(crate) fn parse_invites<R: Read>(reader: R) -> Result<ParsedInvites, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut parsed = ParsedInvites::default();

    for record in csv_reader.deserialize::<LeadRow>() {
        let row = record?;
        match row.email {
            Some(email) => parsed.invites.push(LeadInvite {
                name: row.name.unwrap_or_default(),
                email,
                phone: row.phone,
                source: row.source,
            }),
            None => parsed.skipped += 1,
        }
    }

    Ok(parsed)
}

#[derive(Debug, Default)]
pub(crate) struct ParsedInvites {
    pub(crate) invites: Vec<LeadInvite>,
    pub(crate) skipped: usize,
}

#[derive(Debug, Deserialize)]
struct LeadRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    source: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
