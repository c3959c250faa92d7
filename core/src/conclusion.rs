//! Conclusive narrative of the report.
//!
//! The wording follows the pass/fail selection in the `resultado` checkbox
//! group. With no selection the release wording is used.

use crate::format::to_fixed;

/// Outcome selected by the inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    /// Read the verdict from the checked values of the `resultado` group.
    pub fn from_selection(values: &[String]) -> Option<Self> {
        values.iter().find_map(|value| match value.trim().to_lowercase().as_str() {
            "aprovado" => Some(Verdict::Approved),
            "reprovado" => Some(Verdict::Rejected),
            _ => None,
        })
    }
}

/// Build the conclusive paragraph for an adopted rating.
///
/// Returns `None` when no rating was adopted (`adopted_pmta <= 0`).
pub fn narrative(adopted_pmta: f64, verdict: Option<Verdict>) -> Option<String> {
    if adopted_pmta <= 0.0 {
        return None;
    }
    let pmta = to_fixed(adopted_pmta, 2);
    let text = match verdict {
        Some(Verdict::Rejected) => format!(
            "Através dos resultados obtidos na inspeção de espessura de chapa em obediência à NR-13, \
             o equipamento não atende aos requisitos apontados neste laudo e não estará liberado para \
             funcionamento até que as recomendações sejam atendidas. \
             O valor da PMTA calculado pelo presente documento foi de {pmta} kgf/cm²."
        ),
        Some(Verdict::Approved) | None => format!(
            "Através dos resultados obtidos inspeção de espessura de chapa em obediência à NR-13 e \
             atendendo os requisitos apontados neste laudo, o equipamento estará liberado para \
             funcionamento normal, dentro dos limites estabelecidos pela PMTA. \
             O valor da PMTA calculado pelo presente documento foi de {pmta} kgf/cm²."
        ),
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_selection() {
        assert_eq!(Verdict::from_selection(&[]), None);
        assert_eq!(
            Verdict::from_selection(&["Aprovado".to_string()]),
            Some(Verdict::Approved)
        );
        assert_eq!(
            Verdict::from_selection(&["x".to_string(), "reprovado".to_string()]),
            Some(Verdict::Rejected)
        );
    }

    #[test]
    fn test_narrative_embeds_adopted_pmta() {
        let text = narrative(10.0, None).unwrap();
        assert!(text.contains("10.00 kgf/cm²"));
        assert!(text.contains("liberado para funcionamento normal"));
    }

    #[test]
    fn test_narrative_follows_verdict() {
        let approved = narrative(8.5, Some(Verdict::Approved)).unwrap();
        assert!(approved.contains("estará liberado para funcionamento normal"));

        let rejected = narrative(8.5, Some(Verdict::Rejected)).unwrap();
        assert!(rejected.contains("não estará liberado"));
        assert!(rejected.contains("8.50 kgf/cm²"));
        assert!(!rejected.contains("funcionamento normal"));
    }

    #[test]
    fn test_no_narrative_without_adopted_pmta() {
        assert_eq!(narrative(0.0, Some(Verdict::Approved)), None);
        assert_eq!(narrative(-2.0, None), None);
    }
}
