use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of quiz outcomes. Display content lives with the presentation layer; the engine
/// only hands back the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResultCategory {
    /// Medicare Advantage, non-veteran.
    R01,
    /// Medigap, non-veteran.
    R02,
    /// Dual-eligible special needs plan.
    R03,
    /// Medicare Advantage, veteran receiving VA care.
    R04,
    /// Medigap, veteran receiving VA care.
    R05,
    /// Medicare Advantage, veteran outside the VA.
    R06,
    /// Medigap, veteran outside the VA.
    R07,
    /// Already enrolled in Medicare Advantage.
    R08,
    /// Already enrolled in Medigap.
    R09,
}

impl ResultCategory {
    pub const ALL: [ResultCategory; 9] = [
        ResultCategory::R01,
        ResultCategory::R02,
        ResultCategory::R03,
        ResultCategory::R04,
        ResultCategory::R05,
        ResultCategory::R06,
        ResultCategory::R07,
        ResultCategory::R08,
        ResultCategory::R09,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            ResultCategory::R01 => "R01",
            ResultCategory::R02 => "R02",
            ResultCategory::R03 => "R03",
            ResultCategory::R04 => "R04",
            ResultCategory::R05 => "R05",
            ResultCategory::R06 => "R06",
            ResultCategory::R07 => "R07",
            ResultCategory::R08 => "R08",
            ResultCategory::R09 => "R09",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.code().eq_ignore_ascii_case(raw.trim()))
    }

    pub const fn analytics_name(self) -> &'static str {
        match self {
            ResultCategory::R01 => "medicare_advantage_lower_cost",
            ResultCategory::R02 => "medigap_flexibility",
            ResultCategory::R03 => "dual_eligible_dsnp",
            ResultCategory::R04 => "va_friendly_ma",
            ResultCategory::R05 => "medigap_va_flexibility",
            ResultCategory::R06 => "va_friendly_ma_lower_cost",
            ResultCategory::R07 => "medigap_veteran_flexibility",
            ResultCategory::R08 => "existing_medicare_advantage",
            ResultCategory::R09 => "existing_medigap",
        }
    }

    /// CRM plan name. Early exits never become a stored lead and have no entry.
    pub const fn plan_name(self) -> Option<&'static str> {
        match self {
            ResultCategory::R01 => Some("Advantage"),
            ResultCategory::R02 => Some("Medigap"),
            ResultCategory::R03 => Some("D-SNP"),
            ResultCategory::R04 => Some("Advantage_Veteran_VA"),
            ResultCategory::R05 => Some("Medigap_Veteran_VA"),
            ResultCategory::R06 => Some("Advantage_Veteran"),
            ResultCategory::R07 => Some("Medigap_Veteran"),
            ResultCategory::R08 | ResultCategory::R09 => None,
        }
    }

    pub const fn plan_type(self) -> &'static str {
        match self {
            ResultCategory::R01 | ResultCategory::R08 => "Medicare Advantage plan",
            ResultCategory::R02 | ResultCategory::R05 | ResultCategory::R07 | ResultCategory::R09 => {
                "Medigap (Medicare Supplement) plan"
            }
            ResultCategory::R03 => "Dual Eligible Medicare Advantage plan",
            ResultCategory::R04 | ResultCategory::R06 => "VA-Friendly Medicare Advantage plan",
        }
    }

    pub const fn is_early_exit(self) -> bool {
        matches!(self, ResultCategory::R08 | ResultCategory::R09)
    }

    /// Page view event emitted when the result screen is shown.
    pub const fn view_event(self) -> &'static str {
        match self {
            ResultCategory::R01 => "View_ntm_quiz_result_MA_nonvet",
            ResultCategory::R02 => "View_ntm_quiz_result_MS_nonvet",
            ResultCategory::R03 => "View_ntm_quiz_result_DNSP",
            ResultCategory::R04 => "View_ntm_quiz_result_MA_vet_va",
            ResultCategory::R05 => "View_ntm_quiz_result_MS_vet_va",
            ResultCategory::R06 => "View_ntm_quiz_result_MA_vet_nonva",
            ResultCategory::R07 => "View_ntm_quiz_result_MS_vet_nonva",
            ResultCategory::R08 => "View_ntm_quiz_result_already_enrolled_ma",
            ResultCategory::R09 => "View_ntm_quiz_result_already_enrolled_ms",
        }
    }
}

impl fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Static metadata for a category, as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub result: ResultCategory,
    pub analytics_name: &'static str,
    pub plan_name: Option<&'static str>,
    pub plan_type: &'static str,
    pub is_early_exit: bool,
}

impl From<ResultCategory> for ResultSummary {
    fn from(result: ResultCategory) -> Self {
        Self {
            result,
            analytics_name: result.analytics_name(),
            plan_name: result.plan_name(),
            plan_type: result.plan_type(),
            is_early_exit: result.is_early_exit(),
        }
    }
}
