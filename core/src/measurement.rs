//! Thickness measurement table.
//!
//! The table is an ordered collection owned by the form state. The UI adds,
//! edits and removes rows through it and re-renders from it.

use std::collections::HashSet;

use crate::images::ImageAsset;

/// Largest row id accepted from a stored report.
pub const MAX_STORED_ROW_ID: u32 = 1 << 30;

/// Stable identity of a measurement row, also used to address its photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementRow {
    pub id: RowId,
    /// Point label, e.g. "Costado A".
    pub point: String,
    /// Thickness reading as typed, in mm.
    pub thickness: String,
    pub photo: Option<ImageAsset>,
}

impl MeasurementRow {
    pub fn blank(id: RowId) -> Self {
        Self {
            id,
            point: String::new(),
            thickness: String::new(),
            photo: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementTable {
    rows: Vec<MeasurementRow>,
    last_id: u32,
}

impl MeasurementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding one empty row, the state of a fresh form.
    pub fn with_blank_row() -> Self {
        let mut table = Self::new();
        table.add_row();
        table
    }

    /// Rebuild a table from stored rows.
    ///
    /// Stored ids are kept when every one is non-zero, unique and below
    /// [`MAX_STORED_ROW_ID`]; otherwise all rows are renumbered from 1 in
    /// their stored order.
    pub fn restore(rows: Vec<MeasurementRow>) -> Self {
        let mut seen = HashSet::new();
        let ids_usable = rows
            .iter()
            .all(|row| row.id.0 != 0 && row.id.0 <= MAX_STORED_ROW_ID && seen.insert(row.id));

        let mut table = Self { rows, last_id: 0 };
        if ids_usable {
            table.last_id = table.rows.iter().map(|r| r.id.0).max().unwrap_or(0);
        } else {
            table.renumber();
        }
        table
    }

    /// Renumber rows densely from 1, keeping their order.
    fn renumber(&mut self) {
        let mut next = 0u32;
        for row in &mut self.rows {
            next = next.saturating_add(1);
            row.id = RowId(next);
        }
        self.last_id = next;
    }

    pub fn add_row(&mut self) -> RowId {
        let next = match self.last_id.checked_add(1) {
            Some(next) => next,
            None => {
                self.renumber();
                self.last_id.saturating_add(1)
            }
        };
        self.last_id = next;
        let id = RowId(next);
        self.rows.push(MeasurementRow::blank(id));
        id
    }

    pub fn remove_row(&mut self, id: RowId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    pub fn update_row(&mut self, id: RowId, point: &str, thickness: &str) -> bool {
        match self.row_mut(id) {
            Some(row) => {
                row.point = point.to_string();
                row.thickness = thickness.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_photo(&mut self, id: RowId, photo: ImageAsset) -> bool {
        match self.row_mut(id) {
            Some(row) => {
                row.photo = Some(photo);
                true
            }
            None => false,
        }
    }

    pub fn row(&self, id: RowId) -> Option<&MeasurementRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    fn row_mut(&mut self, id: RowId) -> Option<&mut MeasurementRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_table_has_one_blank_row() {
        let table = MeasurementTable::with_blank_row();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0], MeasurementRow::blank(RowId(1)));
    }

    #[test]
    fn test_add_update_remove() {
        let mut table = MeasurementTable::new();
        let a = table.add_row();
        let b = table.add_row();
        assert_ne!(a, b);

        assert!(table.update_row(b, "Tampo esquerdo", "9.8"));
        assert_eq!(table.row(b).unwrap().thickness, "9.8");

        assert!(table.remove_row(a));
        assert!(!table.remove_row(a));
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].point, "Tampo esquerdo");

        // ids are never reused after removal
        let c = table.add_row();
        assert_eq!(c, RowId(3));
    }

    #[test]
    fn test_unknown_row_is_reported() {
        let mut table = MeasurementTable::with_blank_row();
        assert!(!table.update_row(RowId(42), "x", "1"));
        assert!(!table.set_photo(RowId(42), ImageAsset::from_bytes("image/png", b"x")));
    }

    #[test]
    fn test_set_photo() {
        let mut table = MeasurementTable::with_blank_row();
        let photo = ImageAsset::from_bytes("image/png", &[1, 2, 3]);
        assert!(table.set_photo(RowId(1), photo.clone()));
        assert_eq!(table.row(RowId(1)).unwrap().photo, Some(photo));
    }

    #[test]
    fn test_restore_keeps_unique_ids() {
        let rows = vec![
            MeasurementRow::blank(RowId(2)),
            MeasurementRow::blank(RowId(5)),
        ];
        let mut table = MeasurementTable::restore(rows);
        assert_eq!(
            table.rows().iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![RowId(2), RowId(5)]
        );
        assert_eq!(table.add_row(), RowId(6));
    }

    #[test]
    fn test_restore_renumbers_missing_and_duplicate_ids() {
        let rows = vec![
            MeasurementRow::blank(RowId(0)),
            MeasurementRow::blank(RowId(3)),
            MeasurementRow::blank(RowId(3)),
        ];
        let mut table = MeasurementTable::restore(rows);
        assert_eq!(
            table.rows().iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![RowId(1), RowId(2), RowId(3)]
        );
        assert_eq!(table.add_row(), RowId(4));
    }

    #[test]
    fn test_restore_does_not_trust_ids_near_the_limit() {
        let mut row = MeasurementRow::blank(RowId(u32::MAX));
        row.point = "Costado".to_string();
        let mut table = MeasurementTable::restore(vec![row, MeasurementRow::blank(RowId(u32::MAX))]);
        assert_eq!(
            table.rows().iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![RowId(1), RowId(2)]
        );
        assert_eq!(table.rows()[0].point, "Costado");
        assert_eq!(table.add_row(), RowId(3));
    }

    #[test]
    fn test_add_row_after_exhausted_counter() {
        let mut table = MeasurementTable {
            rows: vec![MeasurementRow::blank(RowId(u32::MAX))],
            last_id: u32::MAX,
        };
        let id = table.add_row();
        assert_eq!(id, RowId(2));
        assert_eq!(
            table.rows().iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![RowId(1), RowId(2)]
        );
    }
}
