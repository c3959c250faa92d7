//! Editing context for one open report.
//!
//! A [`Session`] owns everything the paged form needs between user actions:
//! the form state, the page cursor, whether the report is new, being edited
//! or only viewed, and the image decodes still in flight.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::SessionError;
use crate::fields::{CheckboxGroup, FieldId, ImageTarget};
use crate::form::{FormState, DEFAULT_INSPECTION_INTERVAL_YEARS};
use crate::images::{DecodeTicket, DecodeTracker, ImageAsset};
use crate::measurement::RowId;
use crate::print;
use crate::report::{self, Report};
use crate::store::{KeyValueStore, ReportStore, UpsertOutcome};

/// Number of pages in the paged form.
pub const TOTAL_PAGES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Open the report read-only.
    pub view_only: bool,
    pub inspection_interval_years: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            view_only: false,
            inspection_interval_years: DEFAULT_INSPECTION_INTERVAL_YEARS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// A fresh report; saving appends.
    New,
    /// A stored report; saving replaces list entry `index` when it is known.
    Editing { index: Option<usize> },
    /// Read-only display of a report.
    Viewing,
    /// Saved or discarded; the session accepts no more changes.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The user has not confirmed yet; nothing changed.
    NeedsConfirmation,
    /// The edit marker was cleared and the form discarded.
    Discarded,
}

pub struct Session<S> {
    store: ReportStore<S>,
    form: FormState,
    page: usize,
    mode: SessionMode,
    decodes: DecodeTracker,
}

impl<S: KeyValueStore> Session<S> {
    /// Open the form, restoring the report marked for editing if there is one.
    ///
    /// The marker is read once here; later changes to it do not affect this
    /// session.
    pub fn open(
        store: ReportStore<S>,
        today: NaiveDate,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let mut form = FormState::new(today, options.inspection_interval_years);
        let marker = store.edit_marker()?;

        let mode = match (&marker, options.view_only) {
            (_, true) => SessionMode::Viewing,
            (Some(marker), false) => SessionMode::Editing {
                index: marker.index,
            },
            (None, false) => SessionMode::New,
        };
        if let Some(marker) = &marker {
            form.apply(report::hydrate(&marker.report));
        }

        info!(?mode, restored = marker.is_some(), "report session opened");
        Ok(Self {
            store,
            form,
            page: 1,
            mode,
            decodes: DecodeTracker::new(),
        })
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == SessionMode::Viewing
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn store(&self) -> &ReportStore<S> {
        &self.store
    }

    fn writable(&mut self) -> Result<&mut FormState, SessionError> {
        match self.mode {
            SessionMode::Viewing => Err(SessionError::ReadOnly),
            SessionMode::Closed => Err(SessionError::Closed),
            SessionMode::New | SessionMode::Editing { .. } => Ok(&mut self.form),
        }
    }

    pub fn set_field(&mut self, field: FieldId, value: &str) -> Result<(), SessionError> {
        self.writable()?.set_field(field, value);
        Ok(())
    }

    pub fn set_checkbox(
        &mut self,
        group: CheckboxGroup,
        value: &str,
        checked: bool,
    ) -> Result<(), SessionError> {
        self.writable()?.set_checkbox(group, value, checked);
        Ok(())
    }

    /// Attach an already decoded image.
    pub fn attach_image(
        &mut self,
        target: ImageTarget,
        asset: ImageAsset,
    ) -> Result<(), SessionError> {
        if self.writable()?.attach_image(target, asset) {
            Ok(())
        } else {
            Err(unknown_row(target))
        }
    }

    /// Register the start of an asynchronous image read for `target`.
    pub fn begin_image_decode(&mut self, target: ImageTarget) -> Result<DecodeTicket, SessionError> {
        let form = self.writable()?;
        if let ImageTarget::MeasurementPhoto(row) = target {
            if form.measurements().row(row).is_none() {
                return Err(SessionError::UnknownRow(row.0));
            }
        }
        Ok(self.decodes.begin(target))
    }

    /// Deliver the result of a read started with [`Session::begin_image_decode`].
    ///
    /// Returns whether the image was written. Superseded decodes and decodes
    /// whose measurement row was removed meanwhile are dropped.
    pub fn complete_image_decode(
        &mut self,
        ticket: DecodeTicket,
        asset: ImageAsset,
    ) -> Result<bool, SessionError> {
        self.writable()?;
        let Some(target) = self.decodes.finish(ticket) else {
            return Ok(false);
        };
        let written = self.form.attach_image(target, asset);
        if !written {
            debug!(image = %target.key(), "decode finished after its row was removed");
        }
        Ok(written)
    }

    /// Forget a decode the UI shell could not complete.
    pub fn abandon_image_decode(&mut self, ticket: DecodeTicket) {
        let _ = self.decodes.finish(ticket);
    }

    /// Targets still waiting on a decode.
    pub fn pending_decodes(&self) -> usize {
        self.decodes.in_flight()
    }

    pub fn add_measurement_row(&mut self) -> Result<RowId, SessionError> {
        Ok(self.writable()?.measurements_mut().add_row())
    }

    pub fn remove_measurement_row(&mut self, id: RowId) -> Result<(), SessionError> {
        if self.writable()?.measurements_mut().remove_row(id) {
            Ok(())
        } else {
            Err(SessionError::UnknownRow(id.0))
        }
    }

    pub fn update_measurement_row(
        &mut self,
        id: RowId,
        point: &str,
        thickness: &str,
    ) -> Result<(), SessionError> {
        if self
            .writable()?
            .measurements_mut()
            .update_row(id, point, thickness)
        {
            Ok(())
        } else {
            Err(SessionError::UnknownRow(id.0))
        }
    }

    /// Current page, 1-based.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Move by `delta` pages, clamped to the first and last page.
    pub fn navigate(&mut self, delta: i64) -> usize {
        let target = (self.page as i64).saturating_add(delta);
        self.page = target.clamp(1, TOTAL_PAGES as i64) as usize;
        self.page
    }

    pub fn page_indicator(&self) -> String {
        format!("Página {} de {}", self.page, TOTAL_PAGES)
    }

    /// Snapshot the form and store it, closing the session.
    ///
    /// A validation failure leaves the store, the marker and the session
    /// untouched.
    pub fn save(&mut self, saved_at: DateTime<Utc>) -> Result<UpsertOutcome, SessionError> {
        let form = self.writable()?;
        let report = report::collect(form, saved_at)?;
        let outcome = self.store.upsert(report)?;
        self.mode = SessionMode::Closed;
        Ok(outcome)
    }

    /// The report as it would be saved now, without saving it.
    pub fn snapshot(&self, saved_at: DateTime<Utc>) -> Result<Report, SessionError> {
        Ok(report::collect(&self.form, saved_at)?)
    }

    /// Discard unsaved changes once the user has confirmed.
    pub fn cancel(&mut self, confirmed: bool) -> Result<CancelOutcome, SessionError> {
        if self.mode == SessionMode::Closed {
            return Err(SessionError::Closed);
        }
        if !confirmed {
            return Ok(CancelOutcome::NeedsConfirmation);
        }
        self.store.cancel_edit()?;
        self.mode = SessionMode::Closed;
        info!("report edit discarded");
        Ok(CancelOutcome::Discarded)
    }

    /// Plain-text rendering of every page for printing.
    pub fn printable(&self) -> String {
        print::render(&self.form)
    }
}

fn unknown_row(target: ImageTarget) -> SessionError {
    match target {
        ImageTarget::MeasurementPhoto(row) => SessionError::UnknownRow(row.0),
        ImageTarget::Slot(_) => SessionError::UnknownRow(0),
    }
}
