use crate::error::Res;
use crate::model::Mapping;
use anyhow::Context;
use std::fmt::Debug;
use tracing::debug;

/// A record that can be written to, and read from, one row of a sheet.
pub trait Item: Default + Debug + Clone {
    /// The header row written for this type, in column order.
    fn headers() -> &'static [&'static str];

    /// Given the `header` name and the cell `value`, set the appropriate struct field. Unknown
    /// headers and derived columns are ignored and malformed values are coerced.
    fn set_with_header(&mut self, header: &str, value: &str);

    /// Given the `header` name, retrieve the appropriate struct field value as a cell.
    fn get_by_header(&self, header: &str) -> String;

    /// Convert the struct field values to a row in the order of `headers()`.
    fn to_row(&self) -> Vec<String> {
        Self::headers()
            .iter()
            .map(|h| self.get_by_header(h))
            .collect()
    }

    /// Returns false for rows that were parsed but are not records, such as a totals row.
    fn is_record(&self) -> bool {
        true
    }
}

fn parse_row<S, T>(mapping: &Mapping, values: &[S]) -> Res<T>
where
    S: AsRef<str>,
    T: Item,
{
    let mut item = T::default();
    for (ix, value) in values.iter().enumerate() {
        let header = mapping
            .headers()
            .get(ix)
            .with_context(|| format!("No header found for column index {ix}"))?;
        item.set_with_header(header.as_ref(), value.as_ref());
    }
    Ok(item)
}

/// Given the rows of a sheet, header row first, parse every data row into a `T`. Columns are
/// matched by header name, so their order in the file does not matter. Blank rows and rows that
/// are not records are skipped. Cells past the last header are ignored. An empty sheet parses into
/// an empty list.
pub(crate) fn parse_rows<T: Item>(rows: &[Vec<String>]) -> Res<Vec<T>> {
    let mut rows = rows.iter();
    let mapping = match rows.next() {
        Some(header_row) => Mapping::new(header_row.iter().map(String::as_str))
            .context("Unable to read the header row")?,
        None => return Ok(Vec::new()),
    };

    let mut items = Vec::new();
    for (row_ix, values) in rows.enumerate() {
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let width = values.len().min(mapping.len());
        if width < values.len() {
            debug!(
                "Ignoring {} cells past the last header at row {}",
                values.len() - width,
                row_ix + 2
            );
        }
        let item: T = parse_row(&mapping, &values[..width])?;
        if item.is_record() {
            items.push(item);
        }
    }
    Ok(items)
}

/// Converts the records to data rows in the column order of `T::headers()`.
pub(crate) fn to_rows<T: Item>(data: &[T]) -> Vec<Vec<String>> {
    data.iter().map(Item::to_row).collect()
}
