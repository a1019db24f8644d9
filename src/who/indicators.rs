//! Free-text indicator names to Global Health Observatory codes

use once_cell::sync::Lazy;
use regex::Regex;

/// A GHO indicator the resolver knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
}

const fn info(code: &'static str, name: &'static str, unit: &'static str) -> IndicatorInfo {
    IndicatorInfo { code, name, unit }
}

/// Keyword table, scanned in order; more specific keywords come first so
/// "healthy life expectancy" never resolves to plain life expectancy
const KEYWORDS: &[(&str, IndicatorInfo)] = &[
    ("healthy life expectancy", info("WHOSIS_000002", "Healthy life expectancy (HALE) at birth", "years")),
    ("hale", info("WHOSIS_000002", "Healthy life expectancy (HALE) at birth", "years")),
    ("life expectancy at 60", info("WHOSIS_000015", "Life expectancy at age 60", "years")),
    ("life expectancy", info("WHOSIS_000001", "Life expectancy at birth", "years")),
    ("neonatal mortality", info("WHOSIS_000003", "Neonatal mortality rate", "per 1000 live births")),
    ("infant mortality", info("MDG_0000000001", "Infant mortality rate", "per 1000 live births")),
    ("under-five mortality", info("MDG_0000000007", "Under-five mortality rate", "per 1000 live births")),
    ("under five mortality", info("MDG_0000000007", "Under-five mortality rate", "per 1000 live births")),
    ("child mortality", info("MDG_0000000007", "Under-five mortality rate", "per 1000 live births")),
    ("maternal mortality", info("MDG_0000000026", "Maternal mortality ratio", "per 100 000 live births")),
    ("adult mortality", info("WHOSIS_000004", "Adult mortality rate", "per 1000 population")),
    ("obesity", info("NCD_BMI_30A", "Prevalence of obesity among adults", "%")),
    ("overweight", info("NCD_BMI_25A", "Prevalence of overweight among adults", "%")),
    ("blood pressure", info("NCD_HYP_PREVALENCE_A", "Prevalence of hypertension among adults", "%")),
    ("hypertension", info("NCD_HYP_PREVALENCE_A", "Prevalence of hypertension among adults", "%")),
    ("diabetes", info("NCD_GLUC_04", "Raised fasting blood glucose", "%")),
    ("tobacco", info("M_Est_tob_curr_std", "Prevalence of current tobacco use", "%")),
    ("smoking", info("M_Est_tob_curr_std", "Prevalence of current tobacco use", "%")),
    ("alcohol", info("SA_0000001688", "Alcohol consumption per capita", "litres of pure alcohol")),
    ("hiv", info("HIV_0000000001", "People living with HIV", "persons")),
    ("tuberculosis", info("MDG_0000000020", "Incidence of tuberculosis", "per 100 000 population")),
    ("malaria", info("MALARIA_EST_INCIDENCE", "Estimated malaria incidence", "per 1000 population at risk")),
    ("measles", info("WHS8_110", "Measles immunization coverage among 1-year-olds", "%")),
    ("dtp3", info("WHS4_100", "DTP3 immunization coverage among 1-year-olds", "%")),
    ("immunization", info("WHS4_100", "DTP3 immunization coverage among 1-year-olds", "%")),
    ("physicians", info("HWF_0001", "Medical doctors", "per 10 000 population")),
    ("doctors", info("HWF_0001", "Medical doctors", "per 10 000 population")),
    ("suicide", info("MH_12", "Crude suicide rates", "per 100 000 population")),
    ("road traffic", info("RS_198", "Estimated road traffic death rate", "per 100 000 population")),
    ("health expenditure", info("GHED_CHEGDP_SHA2011", "Current health expenditure as share of GDP", "%")),
];

static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]*(_[A-Za-z0-9]+)+$").expect("valid regex"));

/// How an indicator input was understood
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIndicator {
    /// Matched a keyword in the table
    Known(IndicatorInfo),
    /// Already shaped like a GHO code; passed through as-is
    Literal(String),
}

impl ResolvedIndicator {
    pub fn code(&self) -> &str {
        match self {
            Self::Known(info) => info.code,
            Self::Literal(code) => code,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Known(info) => info.name,
            Self::Literal(code) => code,
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Self::Known(info) => Some(info.unit),
            Self::Literal(_) => None,
        }
    }
}

/// Resolve a free-text indicator name or a literal code
///
/// Keyword containment is checked first, case-insensitively. Input that
/// matches no keyword is used as a code only when it looks like one.
pub fn resolve_indicator(input: &str) -> Option<ResolvedIndicator> {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();

    if let Some((_, info)) = KEYWORDS.iter().find(|(kw, _)| contains_keyword(&lowered, kw)) {
        return Some(ResolvedIndicator::Known(*info));
    }

    CODE_PATTERN
        .is_match(trimmed)
        .then(|| ResolvedIndicator::Literal(trimmed.to_string()))
}

/// Short keywords must stand alone so "hale" does not fire inside "inhaler"
fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    if keyword.len() > 4 {
        return haystack.contains(keyword);
    }
    haystack
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == keyword)
}

/// Display name for an ISO 3166 alpha-3 code, when it is a common one
pub fn country_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "USA" => "United States of America",
        "GBR" => "United Kingdom",
        "CAN" => "Canada",
        "AUS" => "Australia",
        "DEU" => "Germany",
        "FRA" => "France",
        "ITA" => "Italy",
        "ESP" => "Spain",
        "JPN" => "Japan",
        "CHN" => "China",
        "IND" => "India",
        "BRA" => "Brazil",
        "MEX" => "Mexico",
        "RUS" => "Russian Federation",
        "ZAF" => "South Africa",
        "NGA" => "Nigeria",
        "KEN" => "Kenya",
        "EGY" => "Egypt",
        "IDN" => "Indonesia",
        "PAK" => "Pakistan",
        "BGD" => "Bangladesh",
        "KOR" => "Republic of Korea",
        "SWE" => "Sweden",
        "NOR" => "Norway",
        "DNK" => "Denmark",
        "NLD" => "Netherlands",
        "CHE" => "Switzerland",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_keyword_wins() {
        let resolved = resolve_indicator("Healthy life expectancy in Japan").unwrap();
        assert_eq!(resolved.code(), "WHOSIS_000002");

        let resolved = resolve_indicator("life expectancy").unwrap();
        assert_eq!(resolved.code(), "WHOSIS_000001");
        assert_eq!(resolved.unit(), Some("years"));
    }

    #[test]
    fn test_literal_code_fallback() {
        let resolved = resolve_indicator("WHS9_86").unwrap();
        assert_eq!(resolved, ResolvedIndicator::Literal("WHS9_86".into()));
        assert_eq!(resolved.name(), "WHS9_86");
        assert_eq!(resolved.unit(), None);
    }

    #[test]
    fn test_unknown_input_is_unresolved() {
        assert_eq!(resolve_indicator("number of unicorns"), None);
        assert_eq!(resolve_indicator("whs9_86"), None);
        assert_eq!(resolve_indicator("WHOSIS"), None);
    }

    #[test]
    fn test_short_keyword_needs_word_boundary() {
        assert_eq!(resolve_indicator("asthma inhaler use"), None);
        assert_eq!(resolve_indicator("HIV prevalence").unwrap().code(), "HIV_0000000001");
    }

    #[test]
    fn test_country_name() {
        assert_eq!(country_name("USA"), Some("United States of America"));
        assert_eq!(country_name("XYZ"), None);
    }
}
