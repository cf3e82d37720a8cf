//! Recipient profile sensitivity
//!
//! People who can move money or grant access are worth attacking, so messages
//! aimed at them are scored more aggressively.

use crate::model::RecipientProfile;

const HIGH_RISK_ROLES: &[&str] = &["ceo", "cfo", "finance", "hr", "it-admin", "executive"];
const HIGH_RISK_DEPARTMENTS: &[&str] = &["finance", "hr", "executive"];
const MEDIUM_RISK_ROLES: &[&str] = &["manager", "supervisor", "accountant"];

const HIGH_RISK_MULTIPLIER: f64 = 1.2;
const MEDIUM_RISK_MULTIPLIER: f64 = 1.0;
const LOW_RISK_MULTIPLIER: f64 = 0.9;

/// Keywords that are especially dangerous for a department, with their weight
const DEPARTMENT_KEYWORDS: &[(&str, &[(&str, f64)])] = &[
    (
        "finance",
        &[
            ("invoice", 1.3),
            ("payment", 1.4),
            ("wire transfer", 1.5),
            ("account details", 1.4),
            ("urgent payment", 1.6),
        ],
    ),
    (
        "hr",
        &[
            ("resume", 1.2),
            ("employee", 1.3),
            ("payroll", 1.5),
            ("benefits", 1.2),
            ("performance review", 1.3),
        ],
    ),
    (
        "it",
        &[
            ("system maintenance", 1.4),
            ("password reset", 1.5),
            ("security update", 1.3),
            ("server", 1.2),
            ("access required", 1.4),
        ],
    ),
    (
        "executive",
        &[
            ("confidential", 1.4),
            ("board meeting", 1.3),
            ("strategic", 1.2),
            ("acquisition", 1.5),
            ("legal matter", 1.4),
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRisk {
    High,
    Medium,
    Low,
}

impl RoleRisk {
    pub fn for_profile(profile: &RecipientProfile) -> Self {
        let role = normalized(profile.job_role.as_deref());
        let department = normalized(profile.department.as_deref());

        if HIGH_RISK_ROLES.contains(&role.as_str())
            || HIGH_RISK_DEPARTMENTS.contains(&department.as_str())
        {
            RoleRisk::High
        } else if MEDIUM_RISK_ROLES.contains(&role.as_str()) {
            RoleRisk::Medium
        } else {
            RoleRisk::Low
        }
    }

    fn multiplier(self) -> f64 {
        match self {
            RoleRisk::High => HIGH_RISK_MULTIPLIER,
            RoleRisk::Medium => MEDIUM_RISK_MULTIPLIER,
            RoleRisk::Low => LOW_RISK_MULTIPLIER,
        }
    }
}

fn normalized(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_lowercase()
}

/// Score multiplier for `profile` given the message text; 1.0 without a profile
pub fn profile_multiplier(profile: Option<&RecipientProfile>, text: &str, cap: f64) -> f64 {
    let Some(profile) = profile else {
        return 1.0;
    };

    let risk = RoleRisk::for_profile(profile);
    let department = normalized(profile.department.as_deref());
    let text_lower = text.to_lowercase();

    let keyword_multiplier: f64 = DEPARTMENT_KEYWORDS
        .iter()
        .find(|(name, _)| *name == department)
        .map(|(_, keywords)| {
            keywords
                .iter()
                .filter(|(keyword, _)| text_lower.contains(keyword))
                .map(|(_, weight)| weight)
                .product::<f64>()
        })
        .unwrap_or(1.0);

    let multiplier = (risk.multiplier() * keyword_multiplier).min(cap);
    tracing::debug!(
        role_risk = ?risk,
        department = %department,
        multiplier,
        "Applied recipient profile"
    );
    multiplier
}
