//! Sales command handlers.

use crate::args::{DeleteArgs, DuplicateArgs, EditSaleArgs, ListSalesArgs};
use crate::collection::Collection;
use crate::commands::{ensure_saved, plural, refresh_years, row_index, row_indices, Out};
use crate::ledger::Ledger;
use crate::model::{Sale, SaleUpdates};
use crate::period::Period;
use crate::store::Store;
use crate::{Config, Result};
use tracing::debug;

/// A sale together with its row number as the user sees it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NumberedSale {
    pub row: usize,
    pub sale: Sale,
}

/// Lists the sales, optionally only those of one customer and one month. Only the sales sheet is
/// read, no costs or balance file is touched.
pub fn sales_list(config: &Config, args: &ListSalesArgs) -> Result<Out<Vec<NumberedSale>>> {
    let period = args.period()?;
    let mut sales: Collection<Sale> = Collection::new(Store::csv(), config.paths().sales_file());
    sales.load();
    let listed: Vec<NumberedSale> = sales
        .data()
        .iter()
        .enumerate()
        .filter(|(_, sale)| period.map_or(true, |p| p.contains(sale.date())))
        .filter(|(_, sale)| sale.matches_customer(args.customer().unwrap_or_default()))
        .map(|(ix, sale)| NumberedSale {
            row: ix + 1,
            sale: sale.clone(),
        })
        .collect();

    let mut message = format!(
        "{} of {}",
        plural(listed.len(), "sale"),
        sales.len()
    );
    for numbered in &listed {
        message.push('\n');
        message.push_str(&sale_line(numbered.row, &numbered.sale));
    }
    Ok(Out::new(message, listed))
}

/// Adds a sale. The blank sale is dated today and paid in cash, `updates` fills in the rest.
///
/// # Errors
/// - Returns an error if the date is outside the supported years.
/// - Returns an error if the sales sheet could not be written.
pub fn sales_add(config: &Config, updates: SaleUpdates) -> Result<Out<Sale>> {
    let mut sale = Sale::today();
    sale.merge_updates(updates);
    let period = Period::of(sale.date())?;

    let mut ledger = Ledger::open(config, period)?;
    ledger.sales_mut().push(sale.clone());
    ledger.refresh();
    ensure_saved(&ledger)?;
    let row = ledger.sales().len();
    Ok(Out::new(format!("Added {}", sale_line(row, &sale)), sale))
}

/// Changes the fields of one sale given in `args`. The ledger is opened for the current month, so
/// its costs sheet and the current year's balance are created if missing, as for delete and
/// duplicate.
pub fn sales_edit(config: &Config, args: &EditSaleArgs) -> Result<Out<Sale>> {
    let mut ledger = Ledger::open(config, Period::current())?;
    let ix = row_index(args.row(), ledger.sales().len())?;
    let before = ledger.sales().data()[ix].clone();

    let mut edited = before.clone();
    edited.merge_updates(args.updates().clone());
    let after = Period::of(edited.date())?;
    ledger
        .sales_mut()
        .edit(ix, |sale| sale.merge_updates(args.updates().clone()))?;
    ledger.refresh();
    refresh_years(&mut ledger, Period::of(before.date()).ok().into_iter().chain([after]))?;
    ensure_saved(&ledger)?;
    debug!("{before:?} became {edited:?}");
    Ok(Out::new(
        format!("Updated {}", sale_line(args.row(), &edited)),
        edited,
    ))
}

/// Deletes the sales at the given rows. Without `--yes` nothing happens.
pub fn sales_delete(config: &Config, args: &DeleteArgs) -> Result<Out<Vec<Sale>>> {
    let mut ledger = Ledger::open(config, Period::current())?;
    let indices = row_indices(args.rows(), ledger.sales().len())?;
    let deleted: Vec<Sale> = indices
        .iter()
        .filter_map(|&ix| ledger.sales().get(ix).cloned())
        .collect();
    if !args.yes() {
        return Ok(Out::new_message(format!(
            "Not deleting {}, pass --yes to confirm",
            plural(deleted.len(), "sale")
        )));
    }

    ledger.sales_mut().select(indices);
    ledger.sales_mut().delete();
    ledger.refresh();
    refresh_years(&mut ledger, periods(&deleted))?;
    ensure_saved(&ledger)?;
    Ok(Out::new(
        format!("Deleted {}", plural(deleted.len(), "sale")),
        deleted,
    ))
}

/// Copies the sales at the given rows and pastes them after row `--after`.
pub fn sales_duplicate(config: &Config, args: &DuplicateArgs) -> Result<Out<Vec<Sale>>> {
    let mut ledger = Ledger::open(config, Period::current())?;
    let len = ledger.sales().len();
    let indices = row_indices(args.rows(), len)?;
    let after = row_index(args.after(), len)?;

    ledger.sales_mut().select(indices);
    ledger.sales_mut().copy();
    ledger.sales_mut().paste(after);
    let copied = ledger.sales().clipboard().to_vec();
    ledger.refresh();
    refresh_years(&mut ledger, periods(&copied))?;
    ensure_saved(&ledger)?;
    Ok(Out::new(
        format!(
            "Pasted {} after row {}",
            plural(copied.len(), "sale"),
            args.after()
        ),
        copied,
    ))
}

fn periods(sales: &[Sale]) -> Vec<Period> {
    sales
        .iter()
        .filter_map(|sale| Period::of(sale.date()).ok())
        .collect()
}

fn sale_line(row: usize, sale: &Sale) -> String {
    format!(
        "{row:>4}  {}  {:<20} {:<20} {:>5} x {:>12} = {:>14}  {}",
        sale.date(),
        sale.item(),
        sale.customer(),
        sale.quantity(),
        sale.unit_price().to_currency(),
        sale.total().to_currency(),
        sale.payment(),
    )
}
