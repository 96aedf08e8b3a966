// Price list CSV parsing
use crate::model::{LoadError, PriceEntry};
use crate::normalizer::normalize_field;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

pub const DESC_COLUMN: &str = "DESC";
pub const CONTAINER_COLUMN: &str = "CONTAINER";
pub const MASS_COLUMN: &str = "MASS";
pub const AVERAGE_PRICE_COLUMN: &str = "AVERAGE PRICE";

struct ColumnIndex {
    desc: usize,
    container: usize,
    mass: usize,
    average_price: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            desc: find(DESC_COLUMN)?,
            container: find(CONTAINER_COLUMN)?,
            mass: find(MASS_COLUMN)?,
            average_price: find(AVERAGE_PRICE_COLUMN)?,
        })
    }
}

/// Parses the price list into normalized entries, in file order.
///
/// Columns are located by header name; any other columns are ignored.
/// Rows with a blank description are skipped. Numeric cells that do not parse
/// are kept as `None` so the row still shows up in searches.
pub fn parse_price_list(text: &str) -> Result<Vec<PriceEntry>, LoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new().from_reader(text.as_bytes());

    let columns = ColumnIndex::from_headers(reader.headers()?)?;

    let mut entries = Vec::new();
    let mut skipped = 0;
    for record in reader.records() {
        let record = record?;
        let description = normalize_field(record.get(columns.desc).unwrap_or_default());
        if description.trim().is_empty() {
            debug!("Skipping price row {} without a description", entries.len() + skipped + 1);
            skipped += 1;
            continue;
        }
        entries.push(PriceEntry {
            description,
            container: normalize_field(record.get(columns.container).unwrap_or_default()),
            mass: parse_number(record.get(columns.mass)),
            average_price: parse_number(record.get(columns.average_price)),
        });
    }

    Ok(entries)
}

fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
}
