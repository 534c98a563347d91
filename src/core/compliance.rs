//! Reference card for the CFM medical-advertising rules every generated post
//! has to respect.

pub const RESOLUTION: &str = "CFM Resolution No. 2.336/2023";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Required,
    Allowed,
    /// Allowed only under conditions.
    Condition,
    Forbidden,
}

impl RuleKind {
    pub fn label(self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Allowed => "allowed",
            RuleKind::Condition => "only if",
            RuleKind::Forbidden => "forbidden",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub kind: RuleKind,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplianceSection {
    pub article: &'static str,
    pub title: &'static str,
    pub rules: &'static [Rule],
}

const fn rule(kind: RuleKind, text: &'static str) -> Rule {
    Rule { kind, text }
}

use self::RuleKind::{Allowed, Condition, Forbidden, Required};

const GUIDE: &[ComplianceSection] = &[
    ComplianceSection {
        article: "Art. 4",
        title: "Mandatory identification",
        rules: &[
            rule(Required, "The physician's name"),
            rule(Required, "CRM registration number, with the state"),
            rule(Required, "The word \"MÉDICO\""),
            rule(Required, "Specialists: the specialty name and the RQE number"),
        ],
    },
    ComplianceSection {
        article: "Art. 9 and 14",
        title: "Images and before/after",
        rules: &[
            rule(Allowed, "The workplace and equipment registered with Anvisa"),
            rule(Allowed, "Before/after pictures for educational purposes"),
            rule(Condition, "Before/after comes from the physician's own portfolio"),
            rule(Condition, "The patient cannot be identified without express consent"),
            rule(Condition, "The text says every case is different"),
            rule(Forbidden, "Promising the result shown"),
        ],
    },
    ComplianceSection {
        article: "Art. 11",
        title: "Prohibited practices",
        rules: &[
            rule(Forbidden, "Guaranteed results (\"cure guaranteed\", \"pain-free forever\")"),
            rule(Forbidden, "Crediting equipment with unique powers (\"the only machine\")"),
            rule(Forbidden, "Prices as a selling point (discounts, promotions, Black Friday)"),
            rule(Forbidden, "Bundled sales or prizes (\"treat your knee, get a massage\")"),
            rule(Forbidden, "Commercial awards such as \"Doctor of the Year\""),
        ],
    },
    ComplianceSection {
        article: "Art. 8",
        title: "Sensationalism and selfies",
        rules: &[
            rule(Allowed, "Selfies that are not sensationalist"),
            rule(Forbidden, "Methods not recognised by the CFM"),
            rule(Forbidden, "Tampered statistics"),
            rule(Forbidden, "Images meant to cause panic or fear"),
            rule(Forbidden, "Superlatives such as \"the best\" or \"the only one capable\""),
        ],
    },
];

pub fn guide() -> &'static [ComplianceSection] {
    GUIDE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_section_has_rules() {
        assert_eq!(guide().len(), 4);
        assert!(guide().iter().all(|s| !s.rules.is_empty()));
    }

    #[test]
    fn identification_is_all_mandatory() {
        let identification = guide().iter().find(|s| s.article == "Art. 4").unwrap();
        assert!(identification.rules.iter().all(|r| r.kind == RuleKind::Required));
    }

    #[test]
    fn guaranteed_results_are_forbidden() {
        let forbidden: Vec<_> = guide()
            .iter()
            .flat_map(|s| s.rules)
            .filter(|r| r.kind == RuleKind::Forbidden)
            .collect();
        assert!(forbidden.iter().any(|r| r.text.starts_with("Guaranteed results")));
    }
}
