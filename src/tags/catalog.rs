use crate::error::{Error, Result};
use tracing::{info, warn};

/// Used until a refresh succeeds.
pub const FALLBACK_LANGUAGES: &[&str] = &["en", "de", "fr", "ja", "es", "it", "pt", "th", "no"];

/// Membership test for language prefixes.
///
/// Injected into `TagEditor` so that tests and hosts can decide what counts as
/// a language without any process-wide state.
pub trait LanguageSet {
    fn is_supported(&self, code: &str) -> bool;
}

impl<F> LanguageSet for F
where
    F: Fn(&str) -> bool,
{
    fn is_supported(&self, code: &str) -> bool {
        self(code)
    }
}

/// Where refreshed lists come from. The fetch itself (HTTP, IPC, ...) is the
/// host's business; a failing source only costs freshness.
pub trait CatalogSource {
    fn fetch_languages(&self) -> Result<Vec<String>>;
    fn fetch_characters(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    codes: Vec<String>,
}

impl LanguageCatalog {
    pub fn new() -> Self {
        Self::from_codes(FALLBACK_LANGUAGES.iter().map(|c| c.to_string()))
    }

    pub fn from_codes<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut codes: Vec<String> = codes
            .into_iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        codes.dedup();
        Self { codes }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Replaces the set with a freshly fetched one. Failures and empty
    /// answers keep whatever was there before.
    pub fn refresh(&mut self, source: &dyn CatalogSource) -> bool {
        match source.fetch_languages() {
            Ok(codes) if !codes.is_empty() => {
                *self = Self::from_codes(codes);
                info!(count = self.codes.len(), "Refreshed supported languages");
                true
            }
            Ok(_) => {
                warn!("Language source returned no codes, keeping current list");
                false
            }
            Err(e) => {
                warn!("Could not refresh supported languages: {e}");
                false
            }
        }
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageSet for LanguageCatalog {
    fn is_supported(&self, code: &str) -> bool {
        let code = code.to_lowercase();
        self.codes.iter().any(|c| *c == code)
    }
}

/// Known character names, refreshed the same way as languages.
#[derive(Debug, Clone, Default)]
pub struct CharacterRoster {
    names: Vec<String>,
}

impl CharacterRoster {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn refresh(&mut self, source: &dyn CatalogSource) -> bool {
        match source.fetch_characters() {
            Ok(names) if !names.is_empty() => {
                info!(count = names.len(), "Refreshed character roster");
                self.names = names;
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Could not refresh character roster: {e}");
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterKind {
    Integer { min: u64, max: u64 },
    Float { min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParameterKind,
    pub default: f64,
}

pub const PARAMETERS: &[ParameterSpec] = &[
    ParameterSpec {
        name: "seed",
        kind: ParameterKind::Integer { min: 0, max: 4_294_967_295 },
        default: 0.0,
    },
    ParameterSpec {
        name: "temperature",
        kind: ParameterKind::Float { min: 0.1, max: 2.0 },
        default: 0.7,
    },
    ParameterSpec {
        name: "cfg",
        kind: ParameterKind::Float { min: 0.0, max: 20.0 },
        default: 7.0,
    },
    ParameterSpec {
        name: "speed",
        kind: ParameterKind::Float { min: 0.5, max: 2.0 },
        default: 1.0,
    },
    ParameterSpec {
        name: "exaggeration",
        kind: ParameterKind::Float { min: 0.0, max: 2.0 },
        default: 1.0,
    },
    ParameterSpec {
        name: "top_p",
        kind: ParameterKind::Float { min: 0.0, max: 1.0 },
        default: 0.95,
    },
    ParameterSpec {
        name: "top_k",
        kind: ParameterKind::Integer { min: 1, max: 100 },
        default: 50.0,
    },
    ParameterSpec {
        name: "steps",
        kind: ParameterKind::Integer { min: 1, max: 100 },
        default: 30.0,
    },
    ParameterSpec {
        name: "emotion_alpha",
        kind: ParameterKind::Float { min: 0.0, max: 1.0 },
        default: 0.5,
    },
];

pub fn parameter_spec(name: &str) -> Option<&'static ParameterSpec> {
    let name = name.trim().to_lowercase();
    PARAMETERS.iter().find(|spec| spec.name == name)
}

/// Checks a value against the catalog. Unknown parameter names are passed
/// through as free text.
pub fn normalize_value(name: &str, raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(Error::EmptyValue(name.to_string()));
    }

    let Some(spec) = parameter_spec(name) else {
        return Ok(value.to_string());
    };

    let invalid = || Error::InvalidValue {
        name: spec.name.to_string(),
        value: value.to_string(),
    };

    match spec.kind {
        ParameterKind::Integer { min, max } => {
            let parsed: u64 = value.parse().map_err(|_| invalid())?;
            if parsed < min || parsed > max {
                return Err(Error::OutOfRange {
                    name: spec.name.to_string(),
                    value: value.to_string(),
                    min: min as f64,
                    max: max as f64,
                });
            }
        }
        ParameterKind::Float { min, max } => {
            let parsed: f64 = value.parse().map_err(|_| invalid())?;
            if !parsed.is_finite() {
                return Err(invalid());
            }
            if parsed < min || parsed > max {
                return Err(Error::OutOfRange {
                    name: spec.name.to_string(),
                    value: value.to_string(),
                    min,
                    max,
                });
            }
        }
    }

    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        languages: Option<Vec<String>>,
    }

    impl CatalogSource for FixedSource {
        fn fetch_languages(&self) -> Result<Vec<String>> {
            self.languages
                .clone()
                .ok_or_else(|| Error::CatalogUnavailable("offline".to_string()))
        }

        fn fetch_characters(&self) -> Result<Vec<String>> {
            Ok(vec!["Alice".to_string(), "Bob".to_string()])
        }
    }

    #[test]
    fn test_fallback_languages() {
        let catalog = LanguageCatalog::new();
        assert!(catalog.is_supported("en"));
        assert!(catalog.is_supported("DE"));
        assert!(!catalog.is_supported("seed"));
    }

    #[test]
    fn test_refresh_replaces_list() {
        let mut catalog = LanguageCatalog::new();
        let source = FixedSource {
            languages: Some(vec!["ko".to_string(), "zh".to_string()]),
        };
        assert!(catalog.refresh(&source));
        assert!(catalog.is_supported("ko"));
        assert!(!catalog.is_supported("en"));
    }

    #[test]
    fn test_refresh_failure_keeps_previous() {
        let mut catalog = LanguageCatalog::new();
        let offline = FixedSource { languages: None };
        assert!(!catalog.refresh(&offline));
        assert!(catalog.is_supported("en"));

        let empty = FixedSource {
            languages: Some(Vec::new()),
        };
        assert!(!catalog.refresh(&empty));
        assert!(catalog.is_supported("fr"));
    }

    #[test]
    fn test_character_roster_refresh() {
        let mut roster = CharacterRoster::default();
        assert!(roster.refresh(&FixedSource { languages: None }));
        assert!(roster.contains("Alice"));
        assert_eq!(roster.names().len(), 2);
    }

    #[test]
    fn test_closure_language_set() {
        let only_xx = |code: &str| code == "xx";
        assert!(only_xx.is_supported("xx"));
        assert!(!only_xx.is_supported("en"));
    }

    #[test]
    fn test_normalize_known_parameters() {
        assert_eq!(normalize_value("seed", " 42 ").unwrap(), "42");
        assert_eq!(normalize_value("temperature", "0.8").unwrap(), "0.8");
        assert!(matches!(
            normalize_value("temperature", "3.5"),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            normalize_value("top_k", "abc"),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            normalize_value("steps", "0"),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(normalize_value("seed", "  "), Err(Error::EmptyValue(_))));
    }

    #[test]
    fn test_normalize_unknown_parameter_passes_through() {
        assert_eq!(normalize_value("pause", "1s").unwrap(), "1s");
    }
}
