//! Expected accident fields and the presence check run after loading.

use serde::{Deserialize, Serialize};

/// What a declared field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free or categorical text.
    Text,
    /// Counts and other whole numbers.
    Integer,
    /// Measurements and coordinates.
    Float,
    /// The accident date; parsed during consolidation.
    Date,
    /// The reporting year; derived from the date when absent.
    Year,
}

/// A declared field of the accident dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column name as it appears in the header row.
    pub name: String,
    /// What the column holds.
    pub kind: FieldKind,
    /// Whether consolidation fails when the column is absent.
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    /// An optional field.
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }

    /// A field consolidation cannot do without.
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }
}

/// Explicit description of the columns a source is expected to carry.
///
/// The schema is advisory: only fields marked `required` are enforced, and
/// only by presence. Its main job is naming the date and year columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

/// Outcome of checking a table header against a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    /// Required fields that are absent.
    pub missing_required: Vec<String>,
    /// Optional fields that are absent.
    pub missing_optional: Vec<String>,
    /// Columns present in the data but not declared.
    pub unexpected: Vec<String>,
}

impl SchemaReport {
    pub fn is_satisfied(&self) -> bool {
        self.missing_required.is_empty()
    }
}

impl Schema {
    /// A schema with no declared fields.
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Column layout of the federal highway police accident exports.
    pub fn road_police() -> Self {
        use FieldKind::*;

        let fields = [
            ("data_inversa", Date),
            ("dia_semana", Text),
            ("horario", Text),
            ("uf", Text),
            ("br", Integer),
            ("km", Float),
            ("municipio", Text),
            ("causa_acidente", Text),
            ("tipo_acidente", Text),
            ("classificacao_acidente", Text),
            ("fase_dia", Text),
            ("sentido_via", Text),
            ("condicao_metereologica", Text),
            ("tipo_pista", Text),
            ("tracado_via", Text),
            ("uso_solo", Text),
            ("pessoas", Integer),
            ("mortos", Integer),
            ("feridos_leves", Integer),
            ("feridos_graves", Integer),
            ("ilesos", Integer),
            ("veiculos", Integer),
            ("latitude", Float),
            ("longitude", Float),
            ("ano", Year),
        ];

        Self {
            fields: fields
                .into_iter()
                .map(|(name, kind)| FieldSpec::optional(name, kind))
                .collect(),
        }
    }

    /// Add or replace a field.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.retain(|f| f.name != field.name);
        self.fields.push(field);
        self
    }

    /// Declare `name` as the date column, replacing any previous one.
    pub fn with_date_column(self, name: impl Into<String>) -> Self {
        self.with_role(name.into(), FieldKind::Date)
    }

    /// Declare `name` as the year column, replacing any previous one.
    pub fn with_year_column(self, name: impl Into<String>) -> Self {
        self.with_role(name.into(), FieldKind::Year)
    }

    fn with_role(mut self, name: String, kind: FieldKind) -> Self {
        self.fields.retain(|f| f.kind != kind && f.name != name);
        self.fields.push(FieldSpec::optional(name, kind));
        self
    }

    /// Name of the date column, if declared.
    pub fn date_column(&self) -> Option<&str> {
        self.field_of_kind(FieldKind::Date)
    }

    /// Name of the year column, if declared.
    pub fn year_column(&self) -> Option<&str> {
        self.field_of_kind(FieldKind::Year)
    }

    fn field_of_kind(&self, kind: FieldKind) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.kind == kind)
            .map(|f| f.name.as_str())
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Compare declared fields with the columns actually present.
    pub fn check<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> SchemaReport {
        let present: Vec<&str> = columns.into_iter().collect();
        let mut report = SchemaReport::default();

        for field in &self.fields {
            if present.contains(&field.name.as_str()) {
                continue;
            }
            if field.required {
                report.missing_required.push(field.name.clone());
            } else {
                report.missing_optional.push(field.name.clone());
            }
        }

        report.unexpected = present
            .into_iter()
            .filter(|name| self.get(name).is_none())
            .map(str::to_string)
            .collect();

        report
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::road_police()
    }
}
