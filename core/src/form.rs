//! Live state of an open report form.
//!
//! Holds the raw value of every registered field, the checkbox groups, the
//! photo slots and the measurement table, plus the outputs of the last
//! calculation. Every parameter edit triggers a full synchronous recompute.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use tracing::debug;

use crate::conclusion::{narrative, Verdict};
use crate::fields::{CheckboxGroup, FieldId, ImageSlot, ImageTarget};
use crate::images::ImageAsset;
use crate::measurement::{MeasurementRow, MeasurementTable};
use crate::pmta::{
    self, final_result_label, DerivedQuantities, FieldSource, PmtaDisplay, ReportParameters,
};

/// Default years until the next periodic inspection.
pub const DEFAULT_INSPECTION_INTERVAL_YEARS: u32 = 5;

/// Shown in page headers while the tag is empty.
pub const TAG_PLACEHOLDER: &str = "[TAG]";

/// A write into the form, as produced when hydrating a saved report.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMutation {
    SetText { field: FieldId, value: String },
    SetChecked { group: CheckboxGroup, values: Vec<String> },
    SetImage { slot: ImageSlot, asset: ImageAsset },
    ReplaceMeasurements(Vec<MeasurementRow>),
}

#[derive(Debug, Clone)]
pub struct FormState {
    values: BTreeMap<FieldId, String>,
    checked: BTreeMap<CheckboxGroup, Vec<String>>,
    images: BTreeMap<ImageSlot, ImageAsset>,
    measurements: MeasurementTable,
    derived: Option<DerivedQuantities>,
    outputs: PmtaDisplay,
}

impl FormState {
    /// A fresh form: inspection and report dates set to `today`, the next
    /// inspection `interval_years` later, one blank measurement row.
    pub fn new(today: NaiveDate, interval_years: u32) -> Self {
        let next_inspection = today
            .checked_add_months(Months::new(interval_years.saturating_mul(12)))
            .unwrap_or(today);

        let today = iso_date(today);
        let mut values = BTreeMap::new();
        values.insert(FieldId::StartDate, today.clone());
        values.insert(FieldId::EndDate, today.clone());
        values.insert(FieldId::ReportDate, today);
        values.insert(FieldId::NextInspection, iso_date(next_inspection));

        Self {
            values,
            checked: BTreeMap::new(),
            images: BTreeMap::new(),
            measurements: MeasurementTable::with_blank_row(),
            derived: None,
            outputs: PmtaDisplay::placeholder(),
        }
    }

    /// Raw text of a field; empty when never set.
    pub fn value(&self, field: FieldId) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }

    /// Store user input for a field.
    ///
    /// The equipment tag is mirrored into the report tag, and parameter
    /// edits re-run the calculation.
    pub fn set_field(&mut self, field: FieldId, value: &str) {
        self.values.insert(field, value.to_string());
        if field == FieldId::EquipmentTag {
            self.values.insert(FieldId::Tag, value.to_string());
        }
        if field.is_parameter() {
            self.recompute();
        }
    }

    pub fn checked(&self, group: CheckboxGroup) -> &[String] {
        self.checked.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check or uncheck a value. Checking clears every sibling in the group.
    pub fn set_checkbox(&mut self, group: CheckboxGroup, value: &str, checked: bool) {
        let selection = self.checked.entry(group).or_default();
        if checked {
            selection.clear();
            selection.push(value.to_string());
        } else {
            selection.retain(|v| v != value);
        }
        if group == CheckboxGroup::Outcome {
            self.recompute();
        }
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&ImageAsset> {
        self.images.get(&slot)
    }

    pub fn images(&self) -> impl Iterator<Item = (ImageSlot, &ImageAsset)> {
        self.images.iter().map(|(slot, asset)| (*slot, asset))
    }

    /// Write a decoded image into its target.
    ///
    /// Returns false when the target is a measurement row that no longer exists.
    pub fn attach_image(&mut self, target: ImageTarget, asset: ImageAsset) -> bool {
        match target {
            ImageTarget::Slot(slot) => {
                self.images.insert(slot, asset);
                true
            }
            ImageTarget::MeasurementPhoto(row) => self.measurements.set_photo(row, asset),
        }
    }

    pub fn measurements(&self) -> &MeasurementTable {
        &self.measurements
    }

    pub fn measurements_mut(&mut self) -> &mut MeasurementTable {
        &mut self.measurements
    }

    /// Apply raw writes, then refresh the calculated outputs once.
    ///
    /// Unlike [`FormState::set_field`], writes here do not mirror the tag and
    /// keep the final PMTA and conclusion text exactly as written.
    pub fn apply(&mut self, mutations: impl IntoIterator<Item = FieldMutation>) {
        for mutation in mutations {
            match mutation {
                FieldMutation::SetText { field, value } => {
                    self.values.insert(field, value);
                }
                FieldMutation::SetChecked { group, values } => {
                    self.checked.insert(group, values);
                }
                FieldMutation::SetImage { slot, asset } => {
                    self.images.insert(slot, asset);
                }
                FieldMutation::ReplaceMeasurements(rows) => {
                    self.measurements = MeasurementTable::restore(rows);
                }
            }
        }
        self.refresh_outputs();
    }

    pub fn parameters(&self) -> ReportParameters {
        ReportParameters::from_source(self)
    }

    /// Result of the last calculation; `None` while D or Tc is 0.
    pub fn derived(&self) -> Option<&DerivedQuantities> {
        self.derived.as_ref()
    }

    pub fn outputs(&self) -> &PmtaDisplay {
        &self.outputs
    }

    pub fn tag_header(&self) -> &str {
        match self.value(FieldId::Tag) {
            "" => TAG_PLACEHOLDER,
            tag => tag,
        }
    }

    /// Re-derive every calculated output from the current parameters.
    ///
    /// When the geometry yields a result and a positive rating was adopted,
    /// this also rewrites the final PMTA field and the conclusive narrative.
    pub fn recompute(&mut self) {
        let params = self.refresh_outputs();
        if self.derived.is_none() {
            return;
        }

        if let Some(label) = final_result_label(params.adopted_pmta) {
            self.values.insert(FieldId::FinalPmta, label);
        }
        let verdict = Verdict::from_selection(self.checked(CheckboxGroup::Outcome));
        if let Some(text) = narrative(params.adopted_pmta, verdict) {
            self.values.insert(FieldId::Conclusion, text);
        }
    }

    fn refresh_outputs(&mut self) -> ReportParameters {
        let params = self.parameters();
        self.derived = pmta::compute(&params);
        self.outputs = PmtaDisplay::from_outcome(self.derived.as_ref());

        debug!(
            pmta_calc = %self.outputs.pmta_calc,
            pth = %self.outputs.pth,
            "recomputed PMTA"
        );
        params
    }
}

impl FieldSource for FormState {
    fn raw(&self, field: FieldId) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
