//! Field registry: the stable identifiers every form field is addressed by.
//!
//! Keys double as the serialization contract of saved reports, so they keep
//! the names existing reports were written with. Fields are never addressed
//! by their display label.

use std::fmt;

use crate::measurement::RowId;

/// Page section a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Identification,
    Company,
    Equipment,
    Parameters,
    Conclusion,
}

/// Input flavour of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    /// ISO `YYYY-MM-DD`
    Date,
    /// Coerced leniently when read, stored as typed.
    Number,
}

macro_rules! field_catalog {
    ($( $variant:ident => $key:literal, $group:ident, $kind:ident; )+) => {
        /// Every scalar field of a report form.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum FieldId {
            $( $variant, )+
        }

        impl FieldId {
            pub const ALL: &'static [FieldId] = &[ $( FieldId::$variant, )+ ];

            pub fn key(self) -> &'static str {
                match self {
                    $( FieldId::$variant => $key, )+
                }
            }

            pub fn group(self) -> FieldGroup {
                match self {
                    $( FieldId::$variant => FieldGroup::$group, )+
                }
            }

            pub fn kind(self) -> FieldKind {
                match self {
                    $( FieldId::$variant => FieldKind::$kind, )+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $( $key => Some(FieldId::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

field_catalog! {
    Tag => "tag", Identification, Text;
    ReportNumber => "numeroLaudo", Identification, Text;
    ArtNumber => "numeroART", Identification, Text;
    StartDate => "dataInicio", Identification, Date;
    EndDate => "dataFim", Identification, Date;
    ReportDate => "dataLaudo", Identification, Date;
    NextInspection => "proximaInspecao", Identification, Date;

    TradeName => "nomeFantasia", Company, Text;
    LegalName => "razaoSocial", Company, Text;
    Cnpj => "cnpj", Company, Text;
    City => "cidade", Company, Text;
    PostalCode => "cep", Company, Text;
    Email => "email", Company, Text;
    Address => "endereco", Company, Text;
    Phone => "telefone", Company, Text;

    EquipmentTag => "tagEquipamento", Equipment, Text;
    Category => "categoria", Equipment, Text;
    SerialNumber => "numeroSerie", Equipment, Text;
    ManufacturerPmta => "pmtaFabricante", Equipment, Text;
    Model => "modelo", Equipment, Text;
    TestPressure => "pressaoTeste", Equipment, Text;
    Manufacturer => "fabricante", Equipment, Text;
    ServiceFluid => "fluidoServico", Equipment, Text;
    ManufactureYear => "anoFabricacao", Equipment, Text;
    Volume => "volume", Equipment, Text;
    MaxTemperature => "temperaturaMaxima", Equipment, Text;
    Sector => "setor", Equipment, Text;
    ConstructionCode => "codigoConstrucao", Equipment, Text;
    VesselType => "tipoVaso", Equipment, Text;

    Diameter => "D", Parameters, Number;
    ShellThickness => "tc", Parameters, Number;
    LeftHeadThickness => "ttl", Parameters, Number;
    RightHeadThickness => "tts", Parameters, Number;
    ShellStress => "sc", Parameters, Number;
    HeadStress => "st", Parameters, Number;
    LongitudinalEfficiency => "el", Parameters, Number;
    CircumferentialEfficiency => "ec", Parameters, Number;
    AdoptedPmta => "pmtaAdotada", Parameters, Number;

    FinalPmta => "pmtaFinalResultado", Conclusion, Text;
    Findings => "observacoes", Conclusion, Text;
    Conclusion => "parecerConclusivo", Conclusion, Text;
}

impl FieldId {
    /// Whether editing this field changes the PMTA calculation.
    pub fn is_parameter(self) -> bool {
        self.group() == FieldGroup::Parameters
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

macro_rules! keyed_enum {
    ($(#[$meta:meta])* $name:ident { $( $variant:ident => $key:literal, )+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            pub fn key(self) -> &'static str {
                match self {
                    $( $name::$variant => $key, )+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $( $key => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }
    };
}

keyed_enum! {
    /// Checkbox groups where at most one member may be checked at a time.
    CheckboxGroup {
        InspectionType => "tipoInspecao",
        Outcome => "resultado",
        Surface => "superficie",
    }
}

keyed_enum! {
    /// Fixed photo slots of the report pages.
    ImageSlot {
        FrontPage => "imgPage1",
        Nameplate => "imgPlaca",
        SafetyValve => "imgValvula",
        PressureGauge => "imgManometro",
        Record1 => "imgReg1",
        Record2 => "imgReg2",
        Record3 => "imgReg3",
        Record4 => "imgReg4",
        Record5 => "imgReg5",
        Record6 => "imgReg6",
        CalculationPhoto => "imgCalcFoto",
        BodyDiagram => "imgDiagramaCorpo",
        LeftHeadDiagram => "imgDiagramaEsq",
        RightHeadDiagram => "imgDiagramaDir",
    }
}

const MEASUREMENT_PHOTO_PREFIX: &str = "medPhoto";

/// Where a decoded image lands: a fixed slot or a measurement row's photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    Slot(ImageSlot),
    MeasurementPhoto(RowId),
}

impl ImageTarget {
    pub fn key(&self) -> String {
        match self {
            ImageTarget::Slot(slot) => slot.key().to_string(),
            ImageTarget::MeasurementPhoto(row) => format!("{MEASUREMENT_PHOTO_PREFIX}{}", row.0),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        if let Some(slot) = ImageSlot::from_key(key) {
            return Some(ImageTarget::Slot(slot));
        }
        key.strip_prefix(MEASUREMENT_PHOTO_PREFIX)
            .and_then(|id| id.parse::<u32>().ok())
            .filter(|id| *id > 0)
            .map(|id| ImageTarget::MeasurementPhoto(RowId(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_round_trip() {
        for field in FieldId::ALL {
            assert_eq!(FieldId::from_key(field.key()), Some(*field));
        }
        assert_eq!(FieldId::from_key("Nome Fantasia"), None);
    }

    #[test]
    fn test_field_keys_are_unique() {
        let mut keys: Vec<_> = FieldId::ALL.iter().map(|f| f.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), FieldId::ALL.len());
    }

    #[test]
    fn test_parameter_fields() {
        let params: Vec<_> = FieldId::ALL
            .iter()
            .filter(|f| f.is_parameter())
            .map(|f| f.key())
            .collect();
        assert_eq!(
            params,
            vec!["D", "tc", "ttl", "tts", "sc", "st", "el", "ec", "pmtaAdotada"]
        );
        assert!(FieldId::ALL
            .iter()
            .filter(|f| f.is_parameter())
            .all(|f| f.kind() == FieldKind::Number));
    }

    #[test]
    fn test_date_fields() {
        let dates: Vec<_> = FieldId::ALL
            .iter()
            .filter(|f| f.kind() == FieldKind::Date)
            .copied()
            .collect();
        assert_eq!(
            dates,
            vec![
                FieldId::StartDate,
                FieldId::EndDate,
                FieldId::ReportDate,
                FieldId::NextInspection
            ]
        );
    }

    #[test]
    fn test_checkbox_group_keys() {
        assert_eq!(
            CheckboxGroup::from_key("tipoInspecao"),
            Some(CheckboxGroup::InspectionType)
        );
        assert_eq!(CheckboxGroup::Outcome.to_string(), "resultado");
        assert_eq!(CheckboxGroup::from_key("cor"), None);
    }

    #[test]
    fn test_image_slots() {
        assert_eq!(ImageSlot::ALL.len(), 14);
        assert_eq!(ImageSlot::from_key("imgPlaca"), Some(ImageSlot::Nameplate));
        assert_eq!(ImageSlot::Record6.key(), "imgReg6");
    }

    #[test]
    fn test_image_target_keys() {
        assert_eq!(
            ImageTarget::from_key("imgValvula"),
            Some(ImageTarget::Slot(ImageSlot::SafetyValve))
        );
        assert_eq!(
            ImageTarget::from_key("medPhoto3"),
            Some(ImageTarget::MeasurementPhoto(RowId(3)))
        );
        assert_eq!(ImageTarget::MeasurementPhoto(RowId(12)).key(), "medPhoto12");
        assert_eq!(ImageTarget::from_key("medPhoto0"), None);
        assert_eq!(ImageTarget::from_key("medPhotoX"), None);
        assert_eq!(ImageTarget::from_key("imgUnknown"), None);
    }
}
