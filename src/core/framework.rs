//! Best-effort detection of the i18n framework a project uses.
//!
//! Advisory only: the result tunes labels and call-pattern defaults, never
//! indexing correctness. Detection reads the project manifest files and is
//! re-evaluated on every full scan.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Framework {
    VueI18n,
    ReactI18next,
    NextIntl,
    I18next,
    Spring,
    #[default]
    Unknown,
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Framework::VueI18n => "vue-i18n",
            Framework::ReactI18next => "react-i18next",
            Framework::NextIntl => "next-intl",
            Framework::I18next => "i18next",
            Framework::Spring => "spring",
            Framework::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Guess the framework from manifest/build files under the project root.
pub fn detect(project_root: &Path) -> Framework {
    if let Some(framework) = detect_from_package_json(project_root) {
        return framework;
    }
    let spring_markers = ["pom.xml", "build.gradle", "build.gradle.kts"];
    if spring_markers
        .iter()
        .any(|m| project_root.join(m).exists())
    {
        return Framework::Spring;
    }
    Framework::Unknown
}

fn detect_from_package_json(project_root: &Path) -> Option<Framework> {
    let content = fs::read_to_string(project_root.join("package.json")).ok()?;
    let manifest: Value = serde_json::from_str(&content).ok()?;

    let has_dep = |name: &str| {
        ["dependencies", "devDependencies"].iter().any(|section| {
            manifest
                .get(section)
                .and_then(|deps| deps.get(name))
                .is_some()
        })
    };

    // Ordered by specificity: next-intl projects also depend on react.
    if has_dep("vue-i18n") {
        Some(Framework::VueI18n)
    } else if has_dep("next-intl") {
        Some(Framework::NextIntl)
    } else if has_dep("react-i18next") {
        Some(Framework::ReactI18next)
    } else if has_dep("i18next") {
        Some(Framework::I18next)
    } else {
        None
    }
}
