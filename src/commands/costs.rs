//! Costs command handlers. Each one works on the costs sheet of a single month.

use crate::args::{DeleteArgs, DuplicateArgs, PeriodArgs};
use crate::commands::{ensure_saved, plural, row_index, row_indices, Out};
use crate::ledger::Ledger;
use crate::model::{Amount, Cost, CostUpdates};
use crate::{Config, Result};

/// Lists the costs of a month along with their sum.
pub fn costs_list(config: &Config, period: &PeriodArgs) -> Result<Out<Vec<Cost>>> {
    let ledger = Ledger::open(config, period.period()?)?;
    let costs = ledger.costs().data();
    let total: Amount = costs.iter().map(Cost::total).sum();
    let mut message = format!(
        "{} in {}, totalling {}",
        plural(costs.len(), "cost"),
        ledger.period().label(),
        total.to_currency()
    );
    for (ix, cost) in costs.iter().enumerate() {
        message.push('\n');
        message.push_str(&cost_line(ix + 1, cost));
    }
    Ok(Out::new(message, costs.to_vec()))
}

/// Adds a cost to the month. Fields that are not given are left blank.
pub fn costs_add(config: &Config, period: &PeriodArgs, updates: CostUpdates) -> Result<Out<Cost>> {
    let mut ledger = Ledger::open(config, period.period()?)?;
    let mut cost = Cost::default();
    cost.merge_updates(updates);
    ledger.costs_mut().push(cost.clone());
    ledger.refresh();
    ensure_saved(&ledger)?;
    let row = ledger.costs().len();
    Ok(Out::new(format!("Added {}", cost_line(row, &cost)), cost))
}

/// Changes the fields of one cost.
pub fn costs_edit(
    config: &Config,
    period: &PeriodArgs,
    row: usize,
    updates: CostUpdates,
) -> Result<Out<Cost>> {
    let mut ledger = Ledger::open(config, period.period()?)?;
    let ix = row_index(row, ledger.costs().len())?;
    ledger
        .costs_mut()
        .edit(ix, |cost| cost.merge_updates(updates))?;
    ledger.refresh();
    ensure_saved(&ledger)?;
    let cost = ledger.costs().data()[ix].clone();
    Ok(Out::new(format!("Updated {}", cost_line(row, &cost)), cost))
}

/// Deletes the costs at the given rows. Without `--yes` nothing happens.
pub fn costs_delete(
    config: &Config,
    period: &PeriodArgs,
    args: &DeleteArgs,
) -> Result<Out<Vec<Cost>>> {
    let mut ledger = Ledger::open(config, period.period()?)?;
    let indices = row_indices(args.rows(), ledger.costs().len())?;
    let deleted: Vec<Cost> = indices
        .iter()
        .filter_map(|&ix| ledger.costs().get(ix).cloned())
        .collect();
    if !args.yes() {
        return Ok(Out::new_message(format!(
            "Not deleting {}, pass --yes to confirm",
            plural(deleted.len(), "cost")
        )));
    }
    ledger.costs_mut().select(indices);
    ledger.costs_mut().delete();
    ledger.refresh();
    ensure_saved(&ledger)?;
    Ok(Out::new(
        format!("Deleted {}", plural(deleted.len(), "cost")),
        deleted,
    ))
}

/// Copies the costs at the given rows and pastes them after row `--after`.
pub fn costs_duplicate(
    config: &Config,
    period: &PeriodArgs,
    args: &DuplicateArgs,
) -> Result<Out<Vec<Cost>>> {
    let mut ledger = Ledger::open(config, period.period()?)?;
    let len = ledger.costs().len();
    let indices = row_indices(args.rows(), len)?;
    let after = row_index(args.after(), len)?;
    ledger.costs_mut().select(indices);
    ledger.costs_mut().copy();
    ledger.costs_mut().paste(after);
    ledger.refresh();
    ensure_saved(&ledger)?;
    let copied = ledger.costs().clipboard().to_vec();
    Ok(Out::new(
        format!(
            "Pasted {} after row {}",
            plural(copied.len(), "cost"),
            args.after()
        ),
        copied,
    ))
}

fn cost_line(row: usize, cost: &Cost) -> String {
    format!(
        "{row:>4}  {:<20} {:<20} {:>5}  {:>14}",
        cost.activity(),
        cost.element(),
        cost.quantity(),
        cost.total().to_currency(),
    )
}
