use crate::error::EnrichmentError;
use log::{debug, info, warn};
use std::collections::HashMap;

const MAX_CODE_LEN: usize = 4;

/// IATA code to facility type, as read from the tabular type feed.
#[derive(Debug, Clone, Default)]
pub struct TypeFeed {
    pub types: HashMap<String, String>,
    pub rows: usize,
    pub skipped: usize,
}

impl TypeFeed {
    pub fn get(&self, iata: &str) -> Option<&str> {
        self.types.get(iata).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Picks the column whose header equals one of `exact`, falling back to the
/// first header containing `fragment`. Headers compare trimmed and lowercased.
pub fn find_column<'a, I>(headers: I, exact: &[&str], fragment: &str) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized: Vec<String> = headers
        .into_iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();

    exact
        .iter()
        .find_map(|name| normalized.iter().position(|h| h == name))
        .or_else(|| normalized.iter().position(|h| h.contains(fragment)))
}

/// Parses the CSV type feed. A header row is required.
pub fn parse_type_feed(bytes: &[u8]) -> Result<TypeFeed, EnrichmentError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(bytes);

    let headers = rdr.headers()?.clone();
    let idx_iata = find_column(headers.iter(), &["iata_code", "iata"], "iata")
        .ok_or(EnrichmentError::MissingColumn("IATA code"))?;
    let idx_type = find_column(headers.iter(), &["type"], "type")
        .ok_or(EnrichmentError::MissingColumn("type"))?;
    debug!(
        "Type feed columns — iata={} ({}) type={} ({})",
        idx_iata, &headers[idx_iata], idx_type, &headers[idx_type]
    );

    let mut feed = TypeFeed::default();
    let mut unreadable = 0usize;
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping unreadable type feed row — error={}", e);
                unreadable += 1;
                feed.skipped += 1;
                continue;
            }
        };
        feed.rows += 1;

        let code = record.get(idx_iata).unwrap_or("").trim().to_ascii_uppercase();
        let facility_type = record.get(idx_type).unwrap_or("").trim();
        if code.is_empty() || code.chars().count() > MAX_CODE_LEN || facility_type.is_empty() {
            feed.skipped += 1;
            continue;
        }

        feed.types.insert(code, facility_type.to_string());
    }

    if unreadable > 0 {
        warn!("Type feed had unreadable rows — count={}", unreadable);
    }
    info!(
        "Loaded type feed — rows={} codes={} skipped={}",
        feed.rows,
        feed.len(),
        feed.skipped
    );
    Ok(feed)
}
