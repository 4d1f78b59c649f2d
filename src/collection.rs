//! The in-memory owner of one dataset's editable table.
//!
//! A `Collection` loads its records from a sheet, applies edits (add, delete, copy, cut, paste,
//! field edits), rewrites the sheet after every mutation and tells its subscribers that something
//! changed. Storage problems are logged and never returned, so a locked file or a garbled cell
//! never stops the user from working with what is in memory.

use crate::error::{Error, ErrorType, Result};
use crate::model::{parse_rows, to_rows, BalanceLine, Cost, Item, Sale};
use crate::store::Store;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, error, trace, warn};

/// What `paste` does with the clipboard.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PasteMode {
    /// Clones of the clipboard are inserted after the target row.
    InsertRows,
    /// The editable fields of the first clipboard record are copied onto the target row. The
    /// number of rows never changes.
    OverwriteFields,
}

/// Whether rows can be added and removed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Cardinality {
    Growable,
    /// The dataset always has the same rows. Deleting resets them and cutting clears them.
    Fixed,
}

/// The kind of mutation a collection went through.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Change {
    Loaded,
    Added,
    Deleted,
    Cut,
    Pasted,
    Edited,
}

/// A record type that a `Collection` can hold.
pub trait Record: Item {
    const PASTE_MODE: PasteMode = PasteMode::InsertRows;
    const CARDINALITY: Cardinality = Cardinality::Growable;

    /// The record appended by `add_row`.
    fn blank() -> Self {
        Self::default()
    }

    /// Copies the fields that `PasteMode::OverwriteFields` transfers.
    fn paste_onto(&self, target: &mut Self) {
        *target = self.clone();
    }

    /// What deleting a row of a fixed dataset does to it.
    fn reset(&mut self) {}

    /// What cutting a row of a fixed dataset does to it.
    fn clear(&mut self) {}

    /// A row written after the records, e.g. totals. It must not parse as a record.
    fn footer(_data: &[Self]) -> Option<Vec<String>> {
        None
    }
}

impl Record for Sale {
    fn blank() -> Self {
        Sale::today()
    }
}

impl Record for Cost {}

impl Record for BalanceLine {
    const PASTE_MODE: PasteMode = PasteMode::OverwriteFields;
    const CARDINALITY: Cardinality = Cardinality::Fixed;

    fn paste_onto(&self, target: &mut Self) {
        target.set_splits(self.splits());
    }

    fn reset(&mut self) {
        self.set_splits(Default::default());
    }

    fn clear(&mut self) {
        self.set_splits(crate::model::Splits::zero());
    }

    fn footer(data: &[Self]) -> Option<Vec<String>> {
        Some(crate::model::totals_row(data))
    }
}

/// An editable, persisted table of `T`.
#[derive(Debug)]
pub struct Collection<T: Record> {
    store: Store,
    path: PathBuf,
    data: Vec<T>,
    selection: BTreeSet<usize>,
    clipboard: Vec<T>,
    seed: Vec<T>,
    subscribers: Vec<Sender<Change>>,
    unsaved: bool,
    unreadable: bool,
}

impl<T: Record> Collection<T> {
    /// Creates an empty collection bound to `path`. Nothing is read until `load` is called.
    pub fn new(store: Store, path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            path: path.into(),
            data: Vec::new(),
            selection: BTreeSet::new(),
            clipboard: Vec::new(),
            seed: Vec::new(),
            subscribers: Vec::new(),
            unsaved: false,
            unreadable: false,
        }
    }

    /// The records written when the file has to be created. Defaults to none.
    pub fn with_seed(mut self, seed: Vec<T>) -> Self {
        self.seed = seed;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    pub fn selection(&self) -> impl Iterator<Item = usize> + '_ {
        self.selection.iter().copied()
    }

    pub fn clipboard(&self) -> &[T] {
        &self.clipboard
    }

    /// True when the last save failed, i.e. the file is behind what is in memory.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Returns a receiver that gets a `Change` after every mutation.
    pub fn subscribe(&mut self) -> Receiver<Change> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Points the collection at another file and loads it.
    pub fn open(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
        self.load();
    }

    /// Replaces the table with what is in the file. A missing file is created, holding the seed
    /// records if there are any, and then read back. Any other failure is logged and leaves the
    /// table empty, and the file is not written again until a later `load` succeeds.
    pub fn load(&mut self) {
        self.data.clear();
        self.selection.clear();
        self.unreadable = false;
        match self.store.load(&self.path) {
            Ok(rows) => self.parse(&rows),
            Err(e) if e.error_type() == ErrorType::NotFound => {
                debug!("{}, creating it", e);
                if self.create() {
                    match self.store.load(&self.path) {
                        Ok(rows) => self.parse(&rows),
                        Err(e) => self.mark_unreadable(e),
                    }
                }
            }
            Err(e) => self.mark_unreadable(e),
        }
        self.publish(Change::Loaded);
    }

    fn parse(&mut self, rows: &[Vec<String>]) {
        match parse_rows::<T>(rows) {
            Ok(data) => {
                trace!("Parsed {} records from {}", data.len(), self.path.display());
                self.data = data;
            }
            Err(e) => self.mark_unreadable(e),
        }
    }

    fn mark_unreadable(&mut self, e: impl std::fmt::Display) {
        error!("Unable to read '{}': {e:#}", self.path.display());
        self.unreadable = true;
    }

    fn create(&self) -> bool {
        let mut rows = to_rows(&self.seed);
        rows.extend(T::footer(&self.seed));
        match self.store.create_if_missing(&self.path, T::headers(), rows, false) {
            Ok(_) => true,
            Err(e) => {
                error!("Unable to create '{}': {e}", self.path.display());
                false
            }
        }
    }

    /// Rewrites the whole file from the table. A failure is logged and remembered, see
    /// `has_unsaved_changes`. A file that could not be read is never overwritten.
    pub fn save(&mut self) {
        if self.unreadable {
            error!(
                "Not saving '{}', it could not be read and would lose its rows",
                self.path.display()
            );
            self.unsaved = true;
            return;
        }
        let mut rows = to_rows(&self.data);
        rows.extend(T::footer(&self.data));
        match self.store.save(&self.path, T::headers(), rows) {
            Ok(()) => self.unsaved = false,
            Err(e) => {
                error!("Unable to save '{}': {e}", self.path.display());
                self.unsaved = true;
            }
        }
    }

    /// Selects the rows at `indices`, replacing the previous selection. Indices past the end are
    /// ignored.
    pub fn select(&mut self, indices: impl IntoIterator<Item = usize>) {
        let len = self.data.len();
        self.selection = indices.into_iter().filter(|&ix| ix < len).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Appends a blank record. Does nothing for fixed datasets.
    pub fn add_row(&mut self) {
        if T::CARDINALITY == Cardinality::Fixed {
            debug!("Rows cannot be added to {}", self.path.display());
            return;
        }
        self.data.push(T::blank());
        self.commit(Change::Added);
    }

    /// Appends `record`. Does nothing for fixed datasets.
    pub fn push(&mut self, record: T) {
        if T::CARDINALITY == Cardinality::Fixed {
            debug!("Rows cannot be added to {}", self.path.display());
            return;
        }
        self.data.push(record);
        self.commit(Change::Added);
    }

    /// Removes the selected records, or resets them for fixed datasets. Does nothing when the
    /// selection is empty.
    pub fn delete(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.take_selection(T::reset);
        self.commit(Change::Deleted);
    }

    /// Puts clones of the selected records on the clipboard, in table order. An empty selection
    /// leaves the clipboard as it was.
    pub fn copy(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.clipboard = self
            .selection
            .iter()
            .filter_map(|&ix| self.data.get(ix).cloned())
            .collect();
        trace!("Copied {} records", self.clipboard.len());
    }

    /// Removes the selected rows of a growable dataset, or applies `fixed` to them.
    fn take_selection(&mut self, fixed: fn(&mut T)) {
        let selection = std::mem::take(&mut self.selection);
        match T::CARDINALITY {
            Cardinality::Growable => {
                for ix in selection.into_iter().rev() {
                    if ix < self.data.len() {
                        self.data.remove(ix);
                    }
                }
            }
            Cardinality::Fixed => {
                for ix in selection {
                    if let Some(record) = self.data.get_mut(ix) {
                        fixed(record);
                    }
                }
            }
        }
    }

    /// Copies the selection and then removes it, or clears it for fixed datasets.
    pub fn cut(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.copy();
        self.take_selection(T::clear);
        self.commit(Change::Cut);
    }

    /// Pastes the clipboard at the row `at`, see `PasteMode`. Does nothing when the clipboard is
    /// empty or `at` is past the end.
    pub fn paste(&mut self, at: usize) {
        if self.clipboard.is_empty() || at >= self.data.len() {
            debug!(
                "Nothing to paste at row {at} ({} rows, {} on the clipboard)",
                self.data.len(),
                self.clipboard.len()
            );
            return;
        }
        match T::PASTE_MODE {
            PasteMode::InsertRows => {
                for (offset, record) in self.clipboard.iter().enumerate() {
                    self.data.insert(at + 1 + offset, record.clone());
                }
            }
            PasteMode::OverwriteFields => {
                let source = &self.clipboard[0];
                source.paste_onto(&mut self.data[at]);
            }
        }
        self.commit(Change::Pasted);
    }

    /// Changes the record at `index` with `f`, then saves.
    pub fn edit<F>(&mut self, index: usize, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let len = self.data.len();
        let record = self.data.get_mut(index).ok_or_else(|| {
            Error::validation(format!(
                "There is no row {index}, the table has {len} rows"
            ))
        })?;
        f(record);
        self.commit(Change::Edited);
        Ok(())
    }

    /// The table itself. Changes made through it are neither saved nor published.
    pub(crate) fn data_mut(&mut self) -> &mut Vec<T> {
        &mut self.data
    }

    /// Saves and then publishes `change`.
    pub(crate) fn commit(&mut self, change: Change) {
        self.save();
        self.publish(change);
    }

    fn publish(&mut self, change: Change) {
        self.subscribers.retain(|tx| match tx.send(change) {
            Ok(()) => true,
            Err(_) => {
                warn!("Dropping a subscriber that went away");
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, PaymentMethod, Splits};
    use crate::period::Period;
    use crate::store::MemorySheet;
    use chrono::NaiveDate;
    use rust_decimal::prelude::*;
    use tempfile::TempDir;

    fn sale(item: &str, quantity: u32) -> Sale {
        Sale::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            "Maria",
            item,
            quantity,
            dec!(5.00),
            PaymentMethod::Cash,
        )
    }

    fn sales(sheet: &MemorySheet) -> Collection<Sale> {
        let mut c = Collection::new(Store::new(sheet.clone()), "sales.csv");
        c.load();
        for item in ["Rose", "Fern", "Orchid"] {
            c.push(sale(item, 1));
        }
        c
    }

    fn items(c: &Collection<Sale>) -> Vec<&str> {
        c.data().iter().map(|s| s.item()).collect()
    }

    #[test]
    fn test_load_creates_missing_file() {
        let sheet = MemorySheet::new();
        let mut c: Collection<Sale> = Collection::new(Store::new(sheet.clone()), "sales.csv");
        c.load();
        assert!(c.is_empty());
        let rows = sheet.get(Path::new("sales.csv")).unwrap();
        assert_eq!(rows, vec![Sale::headers().iter().map(|h| h.to_string()).collect::<Vec<_>>()]);
    }

    #[test]
    fn test_load_corrupt_leaves_table_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        let mut c: Collection<Sale> = Collection::new(Store::csv(), &path);
        c.load();
        assert!(c.is_empty());
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xff, 0xfe, 0x00, 0xc3]);
    }

    #[test]
    fn test_unreadable_file_is_never_overwritten() {
        let sheet = MemorySheet::new();
        let rows: Vec<Vec<String>> = vec![
            vec!["Date".into(), "Date".into()],
            vec!["2024-03-15".into(), "2024-03-16".into()],
        ];
        sheet.insert("sales.csv", rows.clone());
        let mut c: Collection<Sale> = Collection::new(Store::new(sheet.clone()), "sales.csv");
        c.load();
        assert!(c.is_empty());

        c.add_row();
        c.push(sale("Rose", 1));
        assert!(c.has_unsaved_changes());
        assert_eq!(sheet.get(Path::new("sales.csv")).unwrap(), rows);
        assert_eq!(sheet.writes(), 0);

        let fixed = vec![Sale::headers().iter().map(|h| h.to_string()).collect()];
        sheet.insert("sales.csv", fixed);
        c.load();
        c.push(sale("Fern", 2));
        assert!(!c.has_unsaved_changes());
        assert_eq!(sheet.get(Path::new("sales.csv")).unwrap().len(), 2);
    }

    #[test]
    fn test_long_row_still_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(
            &path,
            "Date,Item,Quantity,UnitValue,TotalValue,Customer,PaymentMethod\n\
             2024-03-15,Rose,1,5.00,5.00,Maria,Cash\n\
             2024-03-16,Fern,2,12,24,Ana,Pix,paid late\n",
        )
        .unwrap();
        let mut c: Collection<Sale> = Collection::new(Store::csv(), &path);
        c.load();
        assert_eq!(items(&c), vec!["Rose", "Fern"]);

        c.push(sale("Orchid", 3));
        assert!(!c.has_unsaved_changes());
        let mut reloaded: Collection<Sale> = Collection::new(Store::csv(), &path);
        reloaded.load();
        assert_eq!(items(&reloaded), vec!["Rose", "Fern", "Orchid"]);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sales.csv");
        let mut c: Collection<Sale> = Collection::new(Store::csv(), &path);
        c.load();
        c.push(sale("Rose", 10));
        c.push(sale("Fern, large", 2));
        let before = c.data().to_vec();

        let mut reloaded: Collection<Sale> = Collection::new(Store::csv(), &path);
        reloaded.load();
        assert_eq!(reloaded.data(), before.as_slice());
    }

    #[test]
    fn test_successive_saves_are_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sales.csv");
        let mut c: Collection<Sale> = Collection::new(Store::csv(), &path);
        c.load();
        c.push(sale("Rose", 10));
        c.save();
        let first = std::fs::read(&path).unwrap();
        c.save();
        assert_eq!(first, std::fs::read(&path).unwrap());
    }

    #[test]
    fn test_add_row_saves_and_publishes() {
        let sheet = MemorySheet::new();
        let mut c: Collection<Sale> = Collection::new(Store::new(sheet.clone()), "sales.csv");
        let rx = c.subscribe();
        c.load();
        c.add_row();
        assert_eq!(c.len(), 1);
        assert_eq!(c.data()[0].payment(), PaymentMethod::Cash);
        assert_eq!(c.data()[0].quantity(), 0);
        assert_eq!(sheet.get(Path::new("sales.csv")).unwrap().len(), 2);
        let changes: Vec<Change> = rx.try_iter().collect();
        assert_eq!(changes, vec![Change::Loaded, Change::Added]);
    }

    #[test]
    fn test_delete_selection() {
        let sheet = MemorySheet::new();
        let mut c = sales(&sheet);
        c.select([0, 2, 99]);
        assert_eq!(c.selection().collect::<Vec<_>>(), vec![0, 2]);
        c.delete();
        assert_eq!(items(&c), vec!["Fern"]);
        assert_eq!(c.selection().count(), 0);
        let writes = sheet.writes();
        c.delete();
        assert_eq!(sheet.writes(), writes);
    }

    #[test]
    fn test_copy_paste_inserts_deep_copies() {
        let sheet = MemorySheet::new();
        let mut c = sales(&sheet);
        c.select([1, 2]);
        c.copy();
        c.paste(0);
        assert_eq!(c.len(), 5);
        assert_eq!(items(&c), vec!["Rose", "Fern", "Orchid", "Fern", "Orchid"]);

        c.edit(1, |s| s.item = "Changed".to_string()).unwrap();
        assert_eq!(c.clipboard()[0].item(), "Fern");
        assert_eq!(c.data()[3].item(), "Fern");
    }

    #[test]
    fn test_paste_out_of_range_or_empty_clipboard() {
        let sheet = MemorySheet::new();
        let mut c = sales(&sheet);
        c.paste(0);
        assert_eq!(c.len(), 3);
        c.select([0]);
        c.copy();
        c.paste(3);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_cut_then_paste_moves_rows() {
        let sheet = MemorySheet::new();
        let mut c = sales(&sheet);
        c.select([0]);
        c.cut();
        assert_eq!(items(&c), vec!["Fern", "Orchid"]);
        c.paste(1);
        assert_eq!(items(&c), vec!["Fern", "Orchid", "Rose"]);
    }

    #[test]
    fn test_edit_out_of_range() {
        let sheet = MemorySheet::new();
        let mut c = sales(&sheet);
        let err = c.edit(3, |s| s.quantity = 1).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[test]
    fn test_failed_save_is_remembered() {
        let sheet = MemorySheet::new();
        let mut c = sales(&sheet);
        sheet.fail_writes(true);
        c.edit(0, |s| s.quantity = 7).unwrap();
        assert!(c.has_unsaved_changes());
        assert_eq!(c.data()[0].quantity(), 7);
        sheet.fail_writes(false);
        c.save();
        assert!(!c.has_unsaved_changes());
    }

    #[test]
    fn test_dropped_subscriber_is_removed() {
        let sheet = MemorySheet::new();
        let mut c = sales(&sheet);
        let rx = c.subscribe();
        drop(rx);
        c.add_row();
        assert!(c.subscribers.is_empty());
    }

    fn balance(sheet: &MemorySheet) -> Collection<BalanceLine> {
        let seed = (1..=12)
            .map(|m| BalanceLine::new(Period::new(2024, m).unwrap()))
            .collect();
        let mut c = Collection::new(Store::new(sheet.clone()), "balance_2024.csv").with_seed(seed);
        c.load();
        c
    }

    #[test]
    fn test_fixed_dataset_is_created_with_seed() {
        let sheet = MemorySheet::new();
        let mut c = balance(&sheet);
        assert_eq!(c.len(), 12);
        let rows = sheet.get(Path::new("balance_2024.csv")).unwrap();
        assert_eq!(rows.len(), 14);
        assert_eq!(rows[13][0], "TOTAL");
        c.add_row();
        assert_eq!(c.len(), 12);
    }

    #[test]
    fn test_fixed_dataset_paste_overwrites_splits() {
        let sheet = MemorySheet::new();
        let mut c = balance(&sheet);
        c.edit(0, |l| {
            l.set_splits(Splits::new(dec!(50), dec!(25), dec!(25)).unwrap());
            l.set_totals(Amount::new(dec!(10)), Amount::ZERO);
        })
        .unwrap();
        c.select([0]);
        c.copy();
        c.paste(5);
        assert_eq!(c.len(), 12);
        assert_eq!(c.data()[5].splits().a(), dec!(50));
        assert_eq!(c.data()[5].month(), 6);
        assert_eq!(c.data()[5].revenue(), Amount::ZERO);
    }

    #[test]
    fn test_fixed_dataset_delete_resets_and_cut_clears() {
        let sheet = MemorySheet::new();
        let mut c = balance(&sheet);
        c.edit(2, |l| l.set_splits(Splits::new(dec!(1), dec!(2), dec!(3)).unwrap()))
            .unwrap();
        c.select([2]);
        c.delete();
        assert_eq!(c.data()[2].splits(), Splits::default());

        c.select([3]);
        c.cut();
        assert_eq!(c.len(), 12);
        assert_eq!(c.data()[3].splits(), Splits::zero());
        assert_eq!(c.clipboard()[0].splits(), Splits::default());
    }
}
