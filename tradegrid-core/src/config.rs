//! Grid configuration, loaded from TOML.
//!
//! Every section has defaults, so an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::FieldAliases;
use crate::filter::MissingPolicy;
use crate::paginate::{DEFAULT_MAX_VISIBLE_PAGES, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use crate::sort::SortSpec;
use crate::view::ViewQuery;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ─── PDF defaults ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PaperSize {
    /// Portrait width and height in PDF points.
    pub fn dimensions_pt(self) -> (f64, f64) {
        match self {
            Self::A4 => (595.28, 841.89),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSettings {
    pub paper: PaperSize,
    pub orientation: Orientation,
    pub margin_mm: f64,
    pub title_font_size: f64,
    pub subtitle_font_size: f64,
    pub body_font_size: f64,
    /// Title colour as RGB bytes.
    pub accent_rgb: [u8; 3],
    /// Fill for every other body row.
    pub stripe_rgb: [u8; 3],
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            orientation: Orientation::Landscape,
            margin_mm: 14.0,
            title_font_size: 18.0,
            subtitle_font_size: 12.0,
            body_font_size: 9.0,
            accent_rgb: [16, 185, 129],
            stripe_rgb: [245, 247, 250],
        }
    }
}

impl PdfSettings {
    /// Page width and height in points after applying the orientation.
    pub fn page_size_pt(&self) -> (f64, f64) {
        let (w, h) = self.paper.dimensions_pt();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    pub fn margin_pt(&self) -> f64 {
        mm_to_pt(self.margin_mm)
    }
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * 72.0 / 25.4
}

// ─── Grid configuration ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub max_visible_pages: usize,
    pub default_sort: Option<SortSpec>,
    /// Policy applied to `required_fields` when incomplete rows are hidden.
    pub missing_policy: MissingPolicy,
    pub required_fields: Vec<String>,
    pub aliases: FieldAliases,
    pub pdf: PdfSettings,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
            default_sort: None,
            missing_policy: MissingPolicy::RequireAny,
            required_fields: Vec::new(),
            aliases: FieldAliases::default(),
            pdf: PdfSettings::default(),
        }
    }
}

impl GridConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be greater than zero".into()));
        }
        if self.max_visible_pages == 0 {
            return Err(ConfigError::Invalid(
                "max_visible_pages must be greater than zero".into(),
            ));
        }
        if self.page_size_options.contains(&0) {
            return Err(ConfigError::Invalid("page_size_options may not contain zero".into()));
        }
        if !self.page_size_options.is_empty() && !self.page_size_options.contains(&self.page_size) {
            return Err(ConfigError::Invalid(format!(
                "page_size {} is not one of {:?}",
                self.page_size, self.page_size_options
            )));
        }
        if self.pdf.margin_mm < 0.0 || self.pdf.body_font_size <= 0.0 {
            return Err(ConfigError::Invalid("pdf margins and font sizes must be positive".into()));
        }
        Ok(())
    }

    /// A first-page query seeded with the configured page size and sort.
    pub fn initial_query(&self) -> ViewQuery {
        ViewQuery {
            sort: self.default_sort.clone(),
            items_per_page: self.page_size,
            max_visible_pages: self.max_visible_pages,
            ..ViewQuery::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortDirection;

    #[test]
    fn empty_toml_is_default() {
        let config = GridConfig::from_toml_str("").unwrap();
        assert_eq!(config, GridConfig::default());
        assert_eq!(config.page_size_options, vec![10, 25, 50, 100]);
        assert_eq!(config.pdf.orientation, Orientation::Landscape);
    }

    #[test]
    fn parses_sections() {
        let config = GridConfig::from_toml_str(
            r#"
page_size = 25
default_sort = "volume_desc"
missing_policy = "require_all"
required_fields = ["country", "volume"]

[aliases]
volume = ["qty"]

[pdf]
paper = "letter"
orientation = "portrait"
margin_mm = 10.0
"#,
        )
        .unwrap();
        assert_eq!(config.page_size, 25);
        let sort = config.default_sort.clone().unwrap();
        assert_eq!(sort.field, "volume");
        assert_eq!(sort.direction, SortDirection::Desc);
        assert_eq!(config.missing_policy, MissingPolicy::RequireAll);
        assert_eq!(config.aliases.volume, vec!["qty"]);
        assert_eq!(config.aliases.name, FieldAliases::default().name);
        assert_eq!(config.pdf.page_size_pt(), (612.0, 792.0));

        let query = config.initial_query();
        assert_eq!(query.items_per_page, 25);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn rejects_invalid_values() {
        for bad in [
            "page_size = 0",
            "max_visible_pages = 0",
            "page_size = 30",
            "page_size_options = [0, 10]",
        ] {
            assert!(
                matches!(GridConfig::from_toml_str(bad), Err(ConfigError::Invalid(_))),
                "{bad} should be rejected"
            );
        }
        assert!(matches!(
            GridConfig::from_toml_str("default_sort = \"volume\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let pdf = PdfSettings::default();
        assert_eq!(pdf.page_size_pt(), (841.89, 595.28));
        assert!((pdf.margin_pt() - 39.685).abs() < 1e-3);
    }

    #[test]
    fn load_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.toml");
        let mut config = GridConfig::default();
        config.page_size = 50;
        config.default_sort = Some(SortSpec::asc("name"));
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(GridConfig::load(&path).unwrap(), config);
        assert!(matches!(
            GridConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
