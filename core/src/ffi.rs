//! Foreign-language surface exported through uniffi.
//!
//! Fields, groups and image targets cross the boundary as their registry
//! keys and are resolved here; anything unknown is rejected with a
//! [`LaudoError`] instead of being ignored.

use chrono::{Local, Utc};
use parking_lot::Mutex;
use tracing::warn;

use crate::config::Config;
use crate::error::LaudoError;
use crate::fields::{CheckboxGroup, FieldId, ImageTarget};
use crate::images::{DecodeTicket, ImageAsset};
use crate::measurement::{MeasurementRow, RowId};
use crate::pmta::{self, FieldSource, PmtaDisplay, ReportParameters};
use crate::session::{CancelOutcome, Session, SessionOptions};
use crate::store::{FileStore, ReportStore};

/// Raw calculation inputs as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct PmtaInputs {
    pub diameter: String,
    pub shell_thickness: String,
    pub left_head_thickness: String,
    pub right_head_thickness: String,
    pub shell_stress: String,
    pub head_stress: String,
    pub longitudinal_efficiency: String,
    pub circumferential_efficiency: String,
    pub adopted_pmta: String,
}

impl FieldSource for PmtaInputs {
    fn raw(&self, field: FieldId) -> Option<&str> {
        let value = match field {
            FieldId::Diameter => &self.diameter,
            FieldId::ShellThickness => &self.shell_thickness,
            FieldId::LeftHeadThickness => &self.left_head_thickness,
            FieldId::RightHeadThickness => &self.right_head_thickness,
            FieldId::ShellStress => &self.shell_stress,
            FieldId::HeadStress => &self.head_stress,
            FieldId::LongitudinalEfficiency => &self.longitudinal_efficiency,
            FieldId::CircumferentialEfficiency => &self.circumferential_efficiency,
            FieldId::AdoptedPmta => &self.adopted_pmta,
            _ => return None,
        };
        Some(value)
    }
}

/// One line of the saved report list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub index: u64,
    pub tag: String,
    pub report_number: String,
    pub report_date: String,
    pub saved_at: Option<String>,
}

/// A measurement row as the UI shell renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementRowView {
    pub id: u32,
    pub point: String,
    pub thickness: String,
    /// Data URL of the row's photo.
    pub photo: Option<String>,
}

impl From<&MeasurementRow> for MeasurementRowView {
    fn from(row: &MeasurementRow) -> Self {
        Self {
            id: row.id.0,
            point: row.point.clone(),
            thickness: row.thickness.clone(),
            photo: row.photo.as_ref().map(|photo| photo.as_str().to_string()),
        }
    }
}

pub fn compute_pmta(inputs: PmtaInputs) -> PmtaDisplay {
    let params = ReportParameters::from_source(&inputs);
    PmtaDisplay::from_outcome(pmta::compute(&params).as_ref())
}

/// Keys of every registered form field.
pub fn field_catalog() -> Vec<String> {
    FieldId::ALL.iter().map(|f| f.key().to_string()).collect()
}

fn field(key: &str) -> Result<FieldId, LaudoError> {
    FieldId::from_key(key).ok_or_else(|| LaudoError::UnknownField(key.to_string()))
}

fn group(key: &str) -> Result<CheckboxGroup, LaudoError> {
    CheckboxGroup::from_key(key).ok_or_else(|| LaudoError::UnknownGroup(key.to_string()))
}

fn target(key: &str) -> Result<ImageTarget, LaudoError> {
    ImageTarget::from_key(key).ok_or_else(|| LaudoError::UnknownTarget(key.to_string()))
}

fn open_store(dir: &str) -> ReportStore<FileStore> {
    ReportStore::new(FileStore::new(dir))
}

/// One open report form backed by a directory of JSON files.
pub struct ReportSession {
    inner: Mutex<Session<FileStore>>,
}

impl ReportSession {
    pub fn new(store_dir: String, view_only: bool) -> Result<Self, LaudoError> {
        let config = Config::from_env()?;
        Self::open(&store_dir, view_only, config.inspection_interval_years)
    }

    /// Open against the directory named by `LAUDO_STORE_DIR`.
    pub fn from_env(view_only: bool) -> Result<Self, LaudoError> {
        let config = Config::from_env()?;
        let dir = config.store_dir.to_string_lossy().into_owned();
        Self::open(&dir, view_only, config.inspection_interval_years)
    }

    fn open(store_dir: &str, view_only: bool, interval_years: u32) -> Result<Self, LaudoError> {
        let options = SessionOptions {
            view_only,
            inspection_interval_years: interval_years,
        };
        let session = Session::open(open_store(store_dir), Local::now().date_naive(), options)?;
        Ok(Self {
            inner: Mutex::new(session),
        })
    }

    pub fn set_field(&self, key: String, value: String) -> Result<(), LaudoError> {
        let field = field(&key)?;
        Ok(self.inner.lock().set_field(field, &value)?)
    }

    pub fn field_value(&self, key: String) -> Result<String, LaudoError> {
        let field = field(&key)?;
        Ok(self.inner.lock().form().value(field).to_string())
    }

    pub fn set_checkbox(
        &self,
        group_key: String,
        value: String,
        checked: bool,
    ) -> Result<(), LaudoError> {
        let group = group(&group_key)?;
        Ok(self.inner.lock().set_checkbox(group, &value, checked)?)
    }

    pub fn checked(&self, group_key: String) -> Result<Vec<String>, LaudoError> {
        let group = group(&group_key)?;
        Ok(self.inner.lock().form().checked(group).to_vec())
    }

    pub fn begin_image_decode(&self, target_key: String) -> Result<u64, LaudoError> {
        let target = target(&target_key)?;
        Ok(self.inner.lock().begin_image_decode(target)?.0)
    }

    /// Returns false when the decode was superseded or its row is gone.
    pub fn complete_image_decode(&self, ticket: u64, data_url: String) -> Result<bool, LaudoError> {
        let mut session = self.inner.lock();
        let Some(asset) = ImageAsset::parse(&data_url) else {
            warn!(ticket, "decoded image is not a base64 data URL");
            session.abandon_image_decode(DecodeTicket(ticket));
            return Ok(false);
        };
        Ok(session.complete_image_decode(DecodeTicket(ticket), asset)?)
    }

    pub fn add_measurement_row(&self) -> Result<u32, LaudoError> {
        Ok(self.inner.lock().add_measurement_row()?.0)
    }

    pub fn remove_measurement_row(&self, id: u32) -> Result<(), LaudoError> {
        Ok(self.inner.lock().remove_measurement_row(RowId(id))?)
    }

    pub fn update_measurement_row(
        &self,
        id: u32,
        point: String,
        thickness: String,
    ) -> Result<(), LaudoError> {
        Ok(self
            .inner
            .lock()
            .update_measurement_row(RowId(id), &point, &thickness)?)
    }

    pub fn measurement_rows(&self) -> Vec<MeasurementRowView> {
        let session = self.inner.lock();
        session
            .form()
            .measurements()
            .rows()
            .iter()
            .map(MeasurementRowView::from)
            .collect()
    }

    /// Data URL attached to an image slot or measurement photo, if any.
    pub fn image(&self, target_key: String) -> Result<Option<String>, LaudoError> {
        let target = target(&target_key)?;
        let session = self.inner.lock();
        let form = session.form();
        let asset = match target {
            ImageTarget::Slot(slot) => form.image(slot),
            ImageTarget::MeasurementPhoto(id) => form
                .measurements()
                .row(id)
                .ok_or(LaudoError::UnknownRow(id.0))?
                .photo
                .as_ref(),
        };
        Ok(asset.map(|asset| asset.as_str().to_string()))
    }

    pub fn outputs(&self) -> PmtaDisplay {
        self.inner.lock().form().outputs().clone()
    }

    pub fn navigate(&self, delta: i32) -> u32 {
        self.inner.lock().navigate(i64::from(delta)) as u32
    }

    pub fn page_indicator(&self) -> String {
        self.inner.lock().page_indicator()
    }

    pub fn tag_header(&self) -> String {
        self.inner.lock().form().tag_header().to_string()
    }

    pub fn is_read_only(&self) -> bool {
        self.inner.lock().is_read_only()
    }

    /// Save and return the report's position in the list.
    pub fn save(&self) -> Result<u64, LaudoError> {
        let outcome = self.inner.lock().save(Utc::now())?;
        Ok(outcome.index() as u64)
    }

    /// Returns true once the edit was discarded.
    pub fn cancel(&self, confirmed: bool) -> Result<bool, LaudoError> {
        let outcome = self.inner.lock().cancel(confirmed)?;
        Ok(outcome == CancelOutcome::Discarded)
    }

    pub fn printable(&self) -> String {
        self.inner.lock().printable()
    }
}

/// The saved report list.
pub struct ReportArchive {
    store: Mutex<ReportStore<FileStore>>,
}

impl ReportArchive {
    pub fn new(store_dir: String) -> Self {
        Self {
            store: Mutex::new(open_store(&store_dir)),
        }
    }

    pub fn list(&self) -> Result<Vec<ReportSummary>, LaudoError> {
        let reports = self.store.lock().list()?;
        Ok(reports
            .into_iter()
            .enumerate()
            .map(|(index, report)| ReportSummary {
                index: index as u64,
                tag: report.tag,
                report_number: report.report_number,
                report_date: report.report_date,
                saved_at: report.saved_at.map(|at| at.to_rfc3339()),
            })
            .collect())
    }

    /// Mark a saved report as open so the next session restores it, either
    /// for editing or for viewing.
    pub fn begin_edit(&self, index: u64) -> Result<(), LaudoError> {
        self.store.lock().edit_existing(index as usize)?;
        Ok(())
    }

    pub fn cancel_edit(&self) -> Result<(), LaudoError> {
        Ok(self.store.lock().cancel_edit()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_inputs() -> PmtaInputs {
        PmtaInputs {
            diameter: "1000".to_string(),
            shell_thickness: "10".to_string(),
            left_head_thickness: "10".to_string(),
            right_head_thickness: "10".to_string(),
            shell_stress: "1200".to_string(),
            head_stress: "1200".to_string(),
            longitudinal_efficiency: "0.85".to_string(),
            circumferential_efficiency: "0.85".to_string(),
            adopted_pmta: "10".to_string(),
        }
    }

    #[test]
    fn test_compute_pmta() {
        let display = compute_pmta(reference_inputs());
        assert_eq!(display.l, "904.50");
        assert_eq!(display.pmta_calc, "17.03");
        assert_eq!(display.pmta_calc_mpa, "1.67");
        assert_eq!(display.pmta_calc_psi, "242.23");
        assert_eq!(display.pth, "15.00");

        let empty = compute_pmta(PmtaInputs::default());
        assert_eq!(empty, PmtaDisplay::placeholder());
    }

    #[test]
    fn test_field_catalog_lists_every_key() {
        let keys = field_catalog();
        assert_eq!(keys.len(), FieldId::ALL.len());
        assert!(keys.iter().any(|k| k == "pmtaAdotada"));
        assert_eq!(keys[0], "tag");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(field("Nome Fantasia"), Err(LaudoError::UnknownField(_))));
        assert!(matches!(group("cor"), Err(LaudoError::UnknownGroup(_))));
        assert!(matches!(target("medPhoto0"), Err(LaudoError::UnknownTarget(_))));
    }

    #[test]
    fn test_session_and_archive_share_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().into_owned();

        let session = ReportSession::open(&path, false, 5).unwrap();
        assert!(matches!(
            session.set_field("???".to_string(), "x".to_string()),
            Err(LaudoError::UnknownField(_))
        ));
        assert!(matches!(session.save(), Err(LaudoError::Validation(_))));

        session
            .set_field("tagEquipamento".to_string(), "VP-7".to_string())
            .unwrap();
        session
            .set_checkbox("resultado".to_string(), "aprovado".to_string(), true)
            .unwrap();
        let ticket = session.begin_image_decode("imgPlaca".to_string()).unwrap();
        assert!(!session
            .complete_image_decode(ticket, "https://example.com/foto.jpg".to_string())
            .unwrap());

        let plate = ImageAsset::from_bytes("image/jpeg", &[7, 8, 9]);
        let ticket = session.begin_image_decode("imgPlaca".to_string()).unwrap();
        assert!(session
            .complete_image_decode(ticket, plate.as_str().to_string())
            .unwrap());

        let row = session.add_measurement_row().unwrap();
        session
            .update_measurement_row(row, "Tampo esquerdo".to_string(), "9.8".to_string())
            .unwrap();
        let photo = ImageAsset::from_bytes("image/png", &[1]);
        let ticket = session.begin_image_decode(format!("medPhoto{row}")).unwrap();
        assert!(session
            .complete_image_decode(ticket, photo.as_str().to_string())
            .unwrap());
        assert_eq!(session.save().unwrap(), 0);

        let archive = ReportArchive::new(path.clone());
        let list = archive.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].tag, "VP-7");
        assert!(list[0].saved_at.is_some());

        archive.begin_edit(0).unwrap();
        let viewer = ReportSession::open(&path, true, 5).unwrap();
        assert!(viewer.is_read_only());
        assert_eq!(viewer.field_value("tag".to_string()).unwrap(), "VP-7");
        assert_eq!(viewer.checked("resultado".to_string()).unwrap(), ["aprovado"]);
        assert_eq!(
            viewer.image("imgPlaca".to_string()).unwrap().as_deref(),
            Some(plate.as_str())
        );
        assert_eq!(viewer.image("imgValvula".to_string()).unwrap(), None);
        assert!(matches!(
            viewer.image("medPhoto999".to_string()),
            Err(LaudoError::UnknownRow(999))
        ));

        let rows = viewer.measurement_rows();
        let restored = rows.iter().find(|r| r.id == row).unwrap();
        assert_eq!(restored.point, "Tampo esquerdo");
        assert_eq!(restored.thickness, "9.8");
        assert_eq!(restored.photo.as_deref(), Some(photo.as_str()));
        assert_eq!(
            viewer.image(format!("medPhoto{row}")).unwrap().as_deref(),
            Some(photo.as_str())
        );
        assert!(matches!(
            viewer.set_field("tag".to_string(), "x".to_string()),
            Err(LaudoError::ReadOnly)
        ));
        assert!(viewer.cancel(true).unwrap());

        assert!(archive.begin_edit(5).is_err());
    }
}
