//! Report aggregate: the serializable snapshot of a whole report.
//!
//! A [`Report`] owns copies of every field group, the checkbox selections,
//! the measurement table, the photos and a snapshot of the displayed outputs.
//! JSON keys keep the names saved reports already use.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ValidationError;
use crate::fields::{CheckboxGroup, FieldId, ImageSlot};
use crate::form::{FieldMutation, FormState};
use crate::images::ImageAsset;
use crate::measurement::{MeasurementRow, RowId};
use crate::pmta::PmtaDisplay;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractingCompany {
    #[serde(rename = "nomeFantasia")]
    pub trade_name: String,
    #[serde(rename = "razaoSocial")]
    pub legal_name: String,
    pub cnpj: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "cep")]
    pub postal_code: String,
    pub email: String,
    #[serde(rename = "endereco")]
    pub address: String,
    #[serde(rename = "telefone")]
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentIdentity {
    pub tag: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "numeroSerie")]
    pub serial_number: String,
    #[serde(rename = "pmtaFabricante")]
    pub manufacturer_pmta: String,
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "pressaoTeste")]
    pub test_pressure: String,
    #[serde(rename = "fabricante")]
    pub manufacturer: String,
    #[serde(rename = "fluidoServico")]
    pub service_fluid: String,
    #[serde(rename = "anoFabricacao")]
    pub manufacture_year: String,
    pub volume: String,
    #[serde(rename = "temperaturaMaxima")]
    pub max_temperature: String,
    #[serde(rename = "setor")]
    pub sector: String,
    #[serde(rename = "codigoConstrucao")]
    pub construction_code: String,
    #[serde(rename = "tipoVaso")]
    pub vessel_type: String,
}

/// Calculation inputs as typed; numbers are only coerced when computing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationInputs {
    #[serde(rename = "D")]
    pub diameter: String,
    #[serde(rename = "tc")]
    pub shell_thickness: String,
    #[serde(rename = "ttl")]
    pub left_head_thickness: String,
    #[serde(rename = "tts")]
    pub right_head_thickness: String,
    #[serde(rename = "sc")]
    pub shell_stress: String,
    #[serde(rename = "st")]
    pub head_stress: String,
    #[serde(rename = "el")]
    pub longitudinal_efficiency: String,
    #[serde(rename = "ec")]
    pub circumferential_efficiency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredMeasurement {
    pub id: u32,
    #[serde(rename = "ponto")]
    pub point: String,
    #[serde(rename = "espessura")]
    pub thickness: String,
    /// Data URL, or empty when the row has no photo.
    #[serde(rename = "foto")]
    pub photo: String,
}

impl From<&MeasurementRow> for StoredMeasurement {
    fn from(row: &MeasurementRow) -> Self {
        Self {
            id: row.id.0,
            point: row.point.clone(),
            thickness: row.thickness.clone(),
            photo: row
                .photo
                .as_ref()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<&StoredMeasurement> for MeasurementRow {
    fn from(stored: &StoredMeasurement) -> Self {
        Self {
            id: RowId(stored.id),
            point: stored.point.clone(),
            thickness: stored.thickness.clone(),
            photo: ImageAsset::parse(&stored.photo),
        }
    }
}

/// A complete inspection report.
///
/// Every field defaults, so reports saved before a field existed still load
/// and simply hydrate that field as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub tag: String,
    #[serde(rename = "numeroLaudo")]
    pub report_number: String,
    #[serde(rename = "numeroART")]
    pub art_number: String,
    #[serde(rename = "dataInicio")]
    pub start_date: String,
    #[serde(rename = "dataFim")]
    pub end_date: String,
    #[serde(rename = "dataLaudo")]
    pub report_date: String,

    #[serde(rename = "tipoInspecao")]
    pub inspection_type: Vec<String>,
    #[serde(rename = "resultado")]
    pub outcome: Vec<String>,
    #[serde(rename = "superficie")]
    pub surface: Vec<String>,

    #[serde(rename = "empresaContratante")]
    pub company: ContractingCompany,
    #[serde(rename = "equipamento")]
    pub equipment: EquipmentIdentity,
    #[serde(rename = "parametrosCalculo")]
    pub parameters: CalculationInputs,

    #[serde(rename = "pmtaAdotada")]
    pub adopted_pmta: String,
    #[serde(rename = "pmtaFinalResultado")]
    pub final_pmta: String,
    #[serde(rename = "proximaInspecao")]
    pub next_inspection: String,

    #[serde(rename = "observacoes")]
    pub findings: String,
    #[serde(rename = "medicoes")]
    pub measurements: Vec<StoredMeasurement>,
    #[serde(rename = "parecerConclusivo")]
    pub conclusion: String,

    /// Outputs as displayed at save time. Never read back into a form.
    #[serde(rename = "resultadosCalculo")]
    pub outputs: PmtaDisplay,

    /// Photo slot key -> data URL.
    #[serde(rename = "imagens")]
    pub images: BTreeMap<String, String>,

    #[serde(rename = "dataSalvamento")]
    pub saved_at: Option<DateTime<Utc>>,
}

macro_rules! report_fields {
    ($( $field:ident => $($path:ident).+ ; )+) => {
        impl Report {
            /// Stored text of a registered field.
            pub fn field(&self, field: FieldId) -> &str {
                match field {
                    $( FieldId::$field => &self.$($path).+, )+
                }
            }

            fn field_mut(&mut self, field: FieldId) -> &mut String {
                match field {
                    $( FieldId::$field => &mut self.$($path).+, )+
                }
            }
        }
    };
}

report_fields! {
    Tag => tag;
    ReportNumber => report_number;
    ArtNumber => art_number;
    StartDate => start_date;
    EndDate => end_date;
    ReportDate => report_date;
    NextInspection => next_inspection;

    TradeName => company.trade_name;
    LegalName => company.legal_name;
    Cnpj => company.cnpj;
    City => company.city;
    PostalCode => company.postal_code;
    Email => company.email;
    Address => company.address;
    Phone => company.phone;

    EquipmentTag => equipment.tag;
    Category => equipment.category;
    SerialNumber => equipment.serial_number;
    ManufacturerPmta => equipment.manufacturer_pmta;
    Model => equipment.model;
    TestPressure => equipment.test_pressure;
    Manufacturer => equipment.manufacturer;
    ServiceFluid => equipment.service_fluid;
    ManufactureYear => equipment.manufacture_year;
    Volume => equipment.volume;
    MaxTemperature => equipment.max_temperature;
    Sector => equipment.sector;
    ConstructionCode => equipment.construction_code;
    VesselType => equipment.vessel_type;

    Diameter => parameters.diameter;
    ShellThickness => parameters.shell_thickness;
    LeftHeadThickness => parameters.left_head_thickness;
    RightHeadThickness => parameters.right_head_thickness;
    ShellStress => parameters.shell_stress;
    HeadStress => parameters.head_stress;
    LongitudinalEfficiency => parameters.longitudinal_efficiency;
    CircumferentialEfficiency => parameters.circumferential_efficiency;
    AdoptedPmta => adopted_pmta;

    FinalPmta => final_pmta;
    Findings => findings;
    Conclusion => conclusion;
}

impl Report {
    pub fn checked(&self, group: CheckboxGroup) -> &[String] {
        match group {
            CheckboxGroup::InspectionType => &self.inspection_type,
            CheckboxGroup::Outcome => &self.outcome,
            CheckboxGroup::Surface => &self.surface,
        }
    }

    fn checked_mut(&mut self, group: CheckboxGroup) -> &mut Vec<String> {
        match group {
            CheckboxGroup::InspectionType => &mut self.inspection_type,
            CheckboxGroup::Outcome => &mut self.outcome,
            CheckboxGroup::Surface => &mut self.surface,
        }
    }
}

/// Snapshot the form into a report, stamped with `saved_at`.
///
/// Values are copied exactly as entered. Fails when the tag is empty, the
/// only mandatory field.
pub fn collect(form: &FormState, saved_at: DateTime<Utc>) -> Result<Report, ValidationError> {
    if form.value(FieldId::Tag).is_empty() {
        warn!("report rejected: tag is empty");
        return Err(ValidationError::MissingTag);
    }

    let mut report = Report::default();
    for &field in FieldId::ALL {
        *report.field_mut(field) = form.value(field).to_string();
    }
    for &group in CheckboxGroup::ALL {
        *report.checked_mut(group) = form.checked(group).to_vec();
    }
    report.measurements = form
        .measurements()
        .rows()
        .iter()
        .map(StoredMeasurement::from)
        .collect();
    report.outputs = form.outputs().clone();
    report.images = form
        .images()
        .map(|(slot, asset)| (slot.key().to_string(), asset.as_str().to_string()))
        .collect();
    report.saved_at = Some(saved_at);
    Ok(report)
}

/// Writes that restore `report` into a form.
///
/// Empty text values are skipped so form defaults survive. Checkbox groups
/// and the measurement table are always replaced. Photos are restored only
/// for known slots holding a real data URL. The stored output snapshot is
/// ignored; applying the writes recomputes it.
pub fn hydrate(report: &Report) -> Vec<FieldMutation> {
    let mut mutations: Vec<FieldMutation> = FieldId::ALL
        .iter()
        .filter_map(|&field| {
            let value = report.field(field);
            (!value.is_empty()).then(|| FieldMutation::SetText {
                field,
                value: value.to_string(),
            })
        })
        .collect();

    mutations.extend(CheckboxGroup::ALL.iter().map(|&group| FieldMutation::SetChecked {
        group,
        values: report.checked(group).to_vec(),
    }));

    mutations.extend(report.images.iter().filter_map(|(key, url)| {
        let slot = ImageSlot::from_key(key)?;
        let asset = ImageAsset::parse(url)?;
        Some(FieldMutation::SetImage { slot, asset })
    }));

    mutations.push(FieldMutation::ReplaceMeasurements(
        report.measurements.iter().map(MeasurementRow::from).collect(),
    ));

    mutations
}
