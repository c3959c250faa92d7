//! Print export.
//!
//! Renders every page of the report in order as plain text, without the
//! navigation chrome of the paged form. The UI shell feeds this to its print
//! pipeline.

use crate::fields::{CheckboxGroup, FieldGroup, FieldId, FieldKind, ImageSlot};
use crate::form::FormState;
use crate::format::{format_date_br, NO_VALUE};
use crate::pmta::{GoverningMode, PmtaDisplay};

fn label(field: FieldId) -> &'static str {
    match field {
        FieldId::Tag => "TAG",
        FieldId::ReportNumber => "Número do laudo",
        FieldId::ArtNumber => "Número da ART",
        FieldId::StartDate => "Início da inspeção",
        FieldId::EndDate => "Fim da inspeção",
        FieldId::ReportDate => "Data do laudo",
        FieldId::NextInspection => "Próxima inspeção",
        FieldId::TradeName => "Nome fantasia",
        FieldId::LegalName => "Razão social",
        FieldId::Cnpj => "CNPJ",
        FieldId::City => "Cidade",
        FieldId::PostalCode => "CEP",
        FieldId::Email => "E-mail",
        FieldId::Address => "Endereço",
        FieldId::Phone => "Telefone",
        FieldId::EquipmentTag => "TAG do equipamento",
        FieldId::Category => "Categoria",
        FieldId::SerialNumber => "Número de série",
        FieldId::ManufacturerPmta => "PMTA do fabricante",
        FieldId::Model => "Modelo",
        FieldId::TestPressure => "Pressão de teste",
        FieldId::Manufacturer => "Fabricante",
        FieldId::ServiceFluid => "Fluido de serviço",
        FieldId::ManufactureYear => "Ano de fabricação",
        FieldId::Volume => "Volume",
        FieldId::MaxTemperature => "Temperatura máxima",
        FieldId::Sector => "Setor",
        FieldId::ConstructionCode => "Código de construção",
        FieldId::VesselType => "Tipo de vaso",
        FieldId::Diameter => "Diâmetro interno D (cm)",
        FieldId::ShellThickness => "Espessura do costado tc (cm)",
        FieldId::LeftHeadThickness => "Espessura do tampo esquerdo ttl (cm)",
        FieldId::RightHeadThickness => "Espessura do tampo direito tts (cm)",
        FieldId::ShellStress => "Tensão admissível do costado Sc (kgf/cm²)",
        FieldId::HeadStress => "Tensão admissível do tampo St (kgf/cm²)",
        FieldId::LongitudinalEfficiency => "Eficiência de junta longitudinal El",
        FieldId::CircumferentialEfficiency => "Eficiência de junta circunferencial Ec",
        FieldId::AdoptedPmta => "PMTA adotada (kgf/cm²)",
        FieldId::FinalPmta => "PMTA final",
        FieldId::Findings => "Observações",
        FieldId::Conclusion => "Parecer conclusivo",
    }
}

fn group_title(group: CheckboxGroup) -> &'static str {
    match group {
        CheckboxGroup::InspectionType => "Tipo de inspeção",
        CheckboxGroup::Outcome => "Resultado",
        CheckboxGroup::Surface => "Superfície",
    }
}

fn governing(mode: GoverningMode) -> &'static str {
    match mode {
        GoverningMode::CircumferentialShell => "costado circunferencial (P2)",
        GoverningMode::LeftHead => "tampo esquerdo (P3)",
        GoverningMode::RightHead => "tampo direito (P4)",
    }
}

fn display(form: &FormState, field: FieldId) -> String {
    let value = form.value(field);
    if value.is_empty() {
        return NO_VALUE.to_string();
    }
    match field.kind() {
        FieldKind::Date => format_date_br(value),
        FieldKind::Text | FieldKind::Number => value.to_string(),
    }
}

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn heading(out: &mut String, title: &str) {
    line(out, &format!("\n== {title} =="));
}

fn fields_of(out: &mut String, form: &FormState, group: FieldGroup) {
    for field in FieldId::ALL.iter().filter(|f| f.group() == group) {
        line(out, &format!("{}: {}", label(*field), display(form, *field)));
    }
}

fn images_of(out: &mut String, form: &FormState, slots: &[ImageSlot]) {
    for slot in slots {
        if let Some(asset) = form.image(*slot) {
            line(out, &format!("[imagem {} ({})]", slot.key(), asset.mime()));
        }
    }
}

fn outputs(out: &mut String, outputs: &PmtaDisplay) {
    let rows = [
        ("L (cm)", &outputs.l),
        ("r (cm)", &outputs.r),
        ("M", &outputs.m),
        ("P1 costado longitudinal (kgf/cm²)", &outputs.p1),
        ("P2 costado circunferencial (kgf/cm²)", &outputs.p2),
        ("P3 tampo esquerdo (kgf/cm²)", &outputs.p3),
        ("P4 tampo direito (kgf/cm²)", &outputs.p4),
        ("PMTA calculada (kgf/cm²)", &outputs.pmta_calc),
        ("PMTA calculada (MPa)", &outputs.pmta_calc_mpa),
        ("PMTA calculada (psi)", &outputs.pmta_calc_psi),
        ("Pressão de teste hidrostático (kgf/cm²)", &outputs.pth),
    ];
    for (name, value) in rows {
        line(out, &format!("{name}: {value}"));
    }
}

/// Render the whole report for printing.
pub fn render(form: &FormState) -> String {
    let mut out = String::new();
    line(&mut out, &format!("LAUDO DE INSPEÇÃO NR-13 - {}", form.tag_header()));
    images_of(&mut out, form, &[ImageSlot::FrontPage]);

    heading(&mut out, "Identificação");
    fields_of(&mut out, form, FieldGroup::Identification);

    heading(&mut out, "Empresa contratante");
    fields_of(&mut out, form, FieldGroup::Company);

    heading(&mut out, "Equipamento");
    fields_of(&mut out, form, FieldGroup::Equipment);
    images_of(
        &mut out,
        form,
        &[
            ImageSlot::Nameplate,
            ImageSlot::SafetyValve,
            ImageSlot::PressureGauge,
        ],
    );

    heading(&mut out, "Inspeção");
    for group in CheckboxGroup::ALL {
        let checked = form.checked(*group);
        let value = if checked.is_empty() {
            NO_VALUE.to_string()
        } else {
            checked.join(", ")
        };
        line(&mut out, &format!("{}: {value}", group_title(*group)));
    }
    images_of(
        &mut out,
        form,
        &[
            ImageSlot::Record1,
            ImageSlot::Record2,
            ImageSlot::Record3,
            ImageSlot::Record4,
            ImageSlot::Record5,
            ImageSlot::Record6,
        ],
    );

    heading(&mut out, "Medição de espessura");
    for row in form.measurements().rows() {
        let point = if row.point.is_empty() { NO_VALUE } else { row.point.as_str() };
        let thickness = if row.thickness.is_empty() {
            NO_VALUE
        } else {
            row.thickness.as_str()
        };
        match &row.photo {
            Some(photo) => line(
                &mut out,
                &format!("{point}: {thickness} mm [foto ({})]", photo.mime()),
            ),
            None => line(&mut out, &format!("{point}: {thickness} mm")),
        }
    }

    heading(&mut out, "Cálculo da PMTA");
    fields_of(&mut out, form, FieldGroup::Parameters);
    outputs(&mut out, form.outputs());
    if let Some(derived) = form.derived() {
        line(
            &mut out,
            &format!("Modo governante: {}", governing(derived.governing_mode())),
        );
    }
    images_of(
        &mut out,
        form,
        &[
            ImageSlot::CalculationPhoto,
            ImageSlot::BodyDiagram,
            ImageSlot::LeftHeadDiagram,
            ImageSlot::RightHeadDiagram,
        ],
    );

    heading(&mut out, "Conclusão");
    fields_of(&mut out, form, FieldGroup::Conclusion);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ImageTarget;
    use crate::images::ImageAsset;
    use crate::measurement::RowId;
    use chrono::NaiveDate;

    fn form() -> FormState {
        FormState::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), 5)
    }

    #[test]
    fn test_sections_in_page_order() {
        let text = render(&form());
        let order = [
            "== Identificação ==",
            "== Empresa contratante ==",
            "== Equipamento ==",
            "== Inspeção ==",
            "== Medição de espessura ==",
            "== Cálculo da PMTA ==",
            "== Conclusão ==",
        ];
        let positions: Vec<_> = order
            .iter()
            .map(|title| text.find(title).unwrap_or_else(|| panic!("missing {title}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_dates_print_in_brazilian_format() {
        let text = render(&form());
        assert!(text.contains("Data do laudo: 19/10/2026"));
        assert!(text.contains("Próxima inspeção: 19/10/2031"));
        assert!(!text.contains("2026-10-19"));
    }

    #[test]
    fn test_placeholder_header_and_outputs() {
        let text = render(&form());
        assert!(text.starts_with("LAUDO DE INSPEÇÃO NR-13 - [TAG]"));
        assert!(text.contains("PMTA calculada (kgf/cm²): -"));
        assert!(text.contains("Número do laudo: -"));
        assert!(!text.contains("Modo governante"));
    }

    #[test]
    fn test_filled_report() {
        let mut form = form();
        form.set_field(FieldId::EquipmentTag, "VP-01");
        form.set_field(FieldId::Diameter, "1000");
        form.set_field(FieldId::ShellThickness, "10");
        form.set_field(FieldId::LeftHeadThickness, "10");
        form.set_field(FieldId::RightHeadThickness, "10");
        form.set_field(FieldId::ShellStress, "1200");
        form.set_field(FieldId::HeadStress, "1200");
        form.set_field(FieldId::LongitudinalEfficiency, "0.85");
        form.set_field(FieldId::CircumferentialEfficiency, "0.85");
        form.set_field(FieldId::AdoptedPmta, "10");
        form.set_checkbox(CheckboxGroup::Outcome, "aprovado", true);
        form.measurements_mut().update_row(RowId(1), "Costado A", "9.9");
        form.attach_image(
            ImageTarget::Slot(ImageSlot::Nameplate),
            ImageAsset::from_bytes("image/jpeg", &[1, 2]),
        );
        form.attach_image(
            ImageTarget::MeasurementPhoto(RowId(1)),
            ImageAsset::from_bytes("image/png", &[3, 4]),
        );

        let text = render(&form);
        assert!(text.starts_with("LAUDO DE INSPEÇÃO NR-13 - VP-01"));
        assert!(text.contains("Resultado: aprovado"));
        assert!(text.contains("Costado A: 9.9 mm [foto (image/png)]"));
        assert!(text.contains("[imagem imgPlaca (image/jpeg)]"));
        assert!(text.contains("PMTA calculada (kgf/cm²): 17.03"));
        assert!(text.contains("Pressão de teste hidrostático (kgf/cm²): 15.00"));
        assert!(text.contains("PMTA final: 10.00 Kgf/cm²"));
        assert!(text.contains("P1 costado longitudinal (kgf/cm²): 41.13"));
        assert!(text.contains("P2 costado circunferencial (kgf/cm²): 20.16"));
        assert!(text.contains("Diâmetro interno D (cm): 1000"));
        assert!(text.contains("L (cm): 904.50"));
        assert!(text.contains("Modo governante: tampo esquerdo (P3)"));
        assert!(!text.contains("(mm)"));
        assert!(!text.contains("imgValvula"));
    }
}
