use serde::Deserialize;

use crate::error::GradeError;
use crate::schema::RoleRules;

/// Optional TOML overrides for the column-inference rule set.
///
/// Any list left out keeps the built-in defaults; a provided list replaces
/// its default wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradeConfig {
    #[serde(default)]
    pub keywords: KeywordOverrides,
    #[serde(default)]
    pub filters: FilterOverrides,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordOverrides {
    pub identifier: Option<Vec<String>>,
    pub answer: Option<Vec<String>>,
    pub score: Option<Vec<String>>,
    pub content: Option<Vec<String>>,
    pub name: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterOverrides {
    pub exclude: Option<Vec<String>>,
}

impl GradeConfig {
    pub fn from_toml(s: &str) -> Result<Self, GradeError> {
        let config: Self =
            toml::from_str(s).map_err(|e| GradeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GradeError> {
        let lists = [
            ("keywords.identifier", &self.keywords.identifier),
            ("keywords.answer", &self.keywords.answer),
            ("keywords.score", &self.keywords.score),
            ("keywords.content", &self.keywords.content),
            ("keywords.name", &self.keywords.name),
            ("filters.exclude", &self.filters.exclude),
        ];
        for (field, list) in lists {
            if let Some(entries) = list {
                if entries.is_empty() {
                    return Err(GradeError::ConfigValidation(format!(
                        "{field} must not be an empty list"
                    )));
                }
                if entries.iter().any(|e| e.trim().is_empty()) {
                    return Err(GradeError::ConfigValidation(format!(
                        "{field} contains an empty keyword"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Materialize the rule set, folding lower-cased overrides onto defaults.
    pub fn rules(&self) -> RoleRules {
        let mut rules = RoleRules::default();
        let fold = |list: &Option<Vec<String>>, target: &mut Vec<String>| {
            if let Some(entries) = list {
                *target = entries.iter().map(|e| e.trim().to_lowercase()).collect();
            }
        };
        fold(&self.keywords.identifier, &mut rules.identifier_keywords);
        fold(&self.keywords.answer, &mut rules.answer_keywords);
        fold(&self.keywords.score, &mut rules.score_keywords);
        fold(&self.keywords.content, &mut rules.content_keywords);
        fold(&self.keywords.name, &mut rules.name_keywords);
        fold(&self.filters.exclude, &mut rules.exclude_patterns);
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{infer_roles, Role};

    const OVERRIDE_TOML: &str = r#"
[keywords]
identifier = ["编号"]
answer = ["正解"]
score = ["配点"]

[filters]
exclude = ["小计"]
"#;

    #[test]
    fn empty_config_uses_defaults() {
        let config = GradeConfig::from_toml("").unwrap();
        let rules = config.rules();
        assert!(rules.identifier_keywords.contains(&"题号".to_string()));
        assert!(rules.exclude_patterns.contains(&"总分".to_string()));
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = GradeConfig::from_toml(OVERRIDE_TOML).unwrap();
        let rules = config.rules();
        assert_eq!(rules.classify("编号"), Some(Role::Identifier));
        assert_eq!(rules.classify("题号"), None);
        assert!(rules.is_excluded_id("小计"));
        assert!(!rules.is_excluded_id("总分"));
        // untouched lists keep their defaults
        assert!(rules.name_keywords.contains(&"姓名".to_string()));
    }

    #[test]
    fn overridden_rules_drive_inference() {
        let config = GradeConfig::from_toml(OVERRIDE_TOML).unwrap();
        let columns: Vec<String> =
            ["编号", "正解", "配点"].iter().map(|s| s.to_string()).collect();
        let map = infer_roles(&columns, &config.rules()).unwrap();
        assert_eq!(map.identifier, "编号");
        assert_eq!(map.score, "配点");
    }

    #[test]
    fn override_keywords_are_case_folded() {
        let config = GradeConfig::from_toml(
            r#"
[keywords]
identifier = ["ITEM"]
"#,
        )
        .unwrap();
        assert_eq!(config.rules().classify("Item No"), Some(Role::Identifier));
    }

    #[test]
    fn empty_list_rejected() {
        let err = GradeConfig::from_toml("[keywords]\nanswer = []\n").unwrap_err();
        match err {
            GradeError::ConfigValidation(msg) => assert!(msg.contains("keywords.answer")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_keyword_rejected() {
        let err = GradeConfig::from_toml("[filters]\nexclude = [\"  \"]\n").unwrap_err();
        match err {
            GradeError::ConfigValidation(msg) => assert!(msg.contains("filters.exclude")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = GradeConfig::from_toml("[scoring]\nmode = \"strict\"\n").unwrap_err();
        assert!(matches!(err, GradeError::ConfigParse(_)));
    }
}
