//! Agent record validation.
//!
//! Checks one record document against the fixed agent-mode schema and
//! produces `(passed, errors, warnings)`.
//!
//! # Stages
//!
//! - Structural: keyed object, exactly one mode definition, slug equals the
//!   storage key. Any failure here stops the remaining stages.
//! - Fields: required fields (errors), extended fields (warnings), nested
//!   object shapes (errors).
//! - Groups shape: length bounds, leading `read`, required tags, closed set.
//! - Instructions: seven `**Section**` markers in `customInstructions`.
//! - Connectivity: unresolved or non-string `interactsWith` entries (warnings).
//!
//! "Deep" findings (`inputSpec`/`outputSpec` sub-fields, `errorHandling`, `healthCheck`, the
//! `command` group, instruction sections) are warnings in relaxed mode and
//! `[STRICT]`-tagged errors in strict mode.

use crate::core::store::{self, SlugIndex};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const REQUIRED_FIELDS: &[&str] = &["slug", "name", "roleDefinition", "customInstructions", "groups"];

pub const EXTENDED_FIELDS: &[&str] = &[
    "whenToUse",
    "inputSpec",
    "outputSpec",
    "connectivity",
    "continuousLearning",
];

pub const VALID_GROUPS: &[&str] = &["read", "edit", "mcp", "ask_followup_question", "command", "browser"];

pub const REQUIRED_SECTIONS: &[&str] = &[
    "Core Purpose",
    "Key Capabilities",
    "Operational Process",
    "Technical Outputs",
    "Domain Specializations",
    "Quality Standards",
    "MCP Tools",
];

const SPEC_DEEP_FIELDS: &[&str] = &["example", "schema", "validationRules"];

/// Message fragments that identify deep findings in rendered output.
pub const DEEP_MARKERS: &[&str] = &[
    "Missing inputSpec.example",
    "Missing inputSpec.schema",
    "Missing inputSpec.validationRules",
    "Missing outputSpec.example",
    "Missing outputSpec.schema",
    "Missing outputSpec.validationRules",
    "Missing or empty field: 'errorHandling'",
    "Missing or empty field: 'healthCheck'",
    "'groups' must contain 'command'",
    "Missing customInstructions sections",
];

pub const STRICT_TAG: &str = "[STRICT] ";

pub const LOAD_FAILURE: &str = "Failed to load or parse JSON";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    pub strict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    fn failed(errors: Vec<String>) -> Self {
        ValidationOutcome {
            passed: false,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Deep findings from either list, with any strict tag removed.
    pub fn deep_findings(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for msg in self.errors.iter().chain(self.warnings.iter()) {
            let plain = msg.strip_prefix(STRICT_TAG).unwrap_or(msg);
            if is_deep_finding(plain) && !out.iter().any(|m| m == plain) {
                out.push(plain.to_string());
            }
        }
        out
    }

    /// Records a failed external check (e.g. a loading probe) against this outcome.
    pub fn reject(&mut self, reason: impl Into<String>) {
        self.errors.push(reason.into());
        self.passed = false;
    }
}

pub fn is_deep_finding(message: &str) -> bool {
    DEEP_MARKERS.iter().any(|m| message.contains(m))
}

/// Missing, null, or an empty string/array/object. Booleans and numbers always count as present.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => false,
    }
}

#[derive(Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
    deep: Vec<String>,
}

impl Findings {
    fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn deep(&mut self, message: impl Into<String>) {
        self.deep.push(message.into());
    }

    fn finish(mut self, options: ValidationOptions) -> ValidationOutcome {
        if options.strict {
            self.errors
                .extend(self.deep.into_iter().map(|m| format!("{STRICT_TAG}{m}")));
        } else {
            self.warnings.extend(self.deep);
        }
        ValidationOutcome {
            passed: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

fn validate_structure<'a>(
    doc: &'a Value,
    expected_slug: &str,
) -> Result<&'a Map<String, Value>, Vec<String>> {
    let Some(root) = doc.as_object() else {
        return Err(vec!["Root element must be a dictionary".to_string()]);
    };
    let Some(modes) = root.get("customModes") else {
        return Err(vec!["Missing 'customModes' key".to_string()]);
    };
    let Some(modes) = modes.as_array() else {
        return Err(vec!["'customModes' must be a list".to_string()]);
    };
    if modes.len() != 1 {
        return Err(vec!["'customModes' must contain exactly one element".to_string()]);
    }
    let Some(mode) = modes[0].as_object() else {
        return Err(vec!["customModes item must be a dictionary".to_string()]);
    };
    let slug = mode.get("slug").and_then(Value::as_str).unwrap_or("");
    if slug.is_empty() || slug != expected_slug {
        let got = match mode.get("slug") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "None".to_string(),
        };
        return Err(vec![format!(
            "'slug' must match filename without extension (expected '{}', got '{}')",
            expected_slug, got
        )]);
    }
    Ok(mode)
}

fn validate_nested_object(findings: &mut Findings, value: &Value, parent: &str, fields: &[&str]) {
    let Some(obj) = value.as_object() else {
        findings.fail(format!("'{parent}' must be an object"));
        return;
    };
    for field in fields {
        if is_blank(obj.get(*field)) {
            findings.fail(format!("Missing or empty field: '{parent}.{field}'"));
        }
    }
}

fn validate_fields(findings: &mut Findings, mode: &Map<String, Value>) {
    for field in REQUIRED_FIELDS {
        if is_blank(mode.get(*field)) {
            findings.fail(format!("Missing or empty required field: '{field}'"));
        }
    }
    for field in EXTENDED_FIELDS {
        if is_blank(mode.get(*field)) {
            findings.warn(format!(
                "Missing extended field: '{field}' (recommended for complete agent definition)"
            ));
        }
    }

    for spec_name in ["inputSpec", "outputSpec"] {
        if let Some(spec) = mode.get(spec_name).filter(|v| !is_blank(Some(*v))) {
            for deep_field in SPEC_DEEP_FIELDS {
                if is_blank(spec.get(*deep_field)) {
                    findings.deep(format!("Missing {spec_name}.{deep_field}"));
                }
            }
        }
    }
    for field in ["errorHandling", "healthCheck"] {
        if is_blank(mode.get(field)) {
            findings.deep(format!("Missing or empty field: '{field}'"));
        }
    }
    let has_command = mode
        .get("groups")
        .and_then(Value::as_array)
        .is_some_and(|groups| groups.iter().any(|g| g.as_str() == Some("command")));
    if !has_command {
        findings.deep("'groups' must contain 'command'");
    }

    let nested: [(&str, &[&str]); 4] = [
        ("inputSpec", &["type", "format"]),
        ("outputSpec", &["type", "format"]),
        ("connectivity", &["interactsWith", "feedbackLoop"]),
        ("continuousLearning", &["enabled", "mechanism"]),
    ];
    for (parent, fields) in nested {
        if let Some(value) = mode.get(parent).filter(|v| !is_blank(Some(*v))) {
            validate_nested_object(findings, value, parent, fields);
        }
    }
}

/// Shape rules for `groups`; each violation is a separate message.
pub fn groups_errors(groups: Option<&Value>) -> Vec<String> {
    let empty = Vec::new();
    let groups = match groups {
        None | Some(Value::Null) => &empty,
        Some(Value::Array(items)) => items,
        Some(_) => return vec!["'groups' must be a list".to_string()],
    };
    let mut errors = Vec::new();
    if groups.len() < 2 || groups.len() > 5 {
        errors.push(format!("'groups' must have 2-5 elements (has {})", groups.len()));
    }
    if groups.first().and_then(Value::as_str) != Some("read") {
        errors.push("First element in 'groups' must be 'read'".to_string());
    }
    let has = |tag: &str| groups.iter().any(|g| g.as_str() == Some(tag));
    if !has("edit") {
        errors.push("'groups' must contain 'edit'".to_string());
    }
    if !has("mcp") {
        errors.push("'groups' must contain 'mcp'".to_string());
    }
    if !has("ask_followup_question") && !has("command") {
        errors.push("'groups' must contain either 'ask_followup_question' or 'command'".to_string());
    }
    for group in groups {
        match group.as_str() {
            Some(tag) if VALID_GROUPS.contains(&tag) => {}
            Some(tag) => errors.push(format!("Invalid group item: '{tag}'")),
            None => errors.push(format!("Invalid group item: '{group}'")),
        }
    }
    errors
}

fn validate_instructions(findings: &mut Findings, mode: &Map<String, Value>) {
    let instructions = mode.get("customInstructions");
    if is_blank(instructions) {
        findings.fail("customInstructions cannot be empty");
        return;
    }
    let text = instructions.and_then(Value::as_str).unwrap_or("");
    let missing: Vec<&str> = REQUIRED_SECTIONS
        .iter()
        .copied()
        .filter(|section| !text.contains(&format!("**{section}**")))
        .collect();
    if !missing.is_empty() {
        findings.deep(format!(
            "Missing customInstructions sections: {}",
            missing.join(", ")
        ));
    }
}

fn validate_connectivity(findings: &mut Findings, mode: &Map<String, Value>, index: &dyn SlugIndex) {
    let Some(connectivity) = mode.get("connectivity").and_then(Value::as_object) else {
        return;
    };
    let Some(interacts_with) = connectivity.get("interactsWith").and_then(Value::as_array) else {
        return;
    };
    let mut unresolved = Vec::new();
    let mut non_string = Vec::new();
    for entry in interacts_with {
        match entry.as_str() {
            Some(slug) if !slug.is_empty() && !index.contains(slug) => unresolved.push(slug.to_string()),
            Some(_) => {}
            None => non_string.push(entry.to_string()),
        }
    }
    if !unresolved.is_empty() {
        findings.warn(format!(
            "Invalid interactsWith references: {}",
            unresolved.join(", ")
        ));
    }
    if !non_string.is_empty() {
        findings.warn(format!(
            "Non-string interactsWith entries found: {}",
            non_string.join(", ")
        ));
    }
}

/// Validate one record document whose storage key is `expected_slug`.
pub fn validate_record(
    doc: &Value,
    expected_slug: &str,
    index: &dyn SlugIndex,
    options: ValidationOptions,
) -> ValidationOutcome {
    let mode = match validate_structure(doc, expected_slug) {
        Ok(mode) => mode,
        Err(errors) => return ValidationOutcome::failed(errors),
    };

    let mut findings = Findings::default();
    validate_fields(&mut findings, mode);
    for e in groups_errors(mode.get("groups")) {
        findings.fail(e);
    }
    validate_instructions(&mut findings, mode);
    validate_connectivity(&mut findings, mode, index);
    findings.finish(options)
}

/// Load and validate a record file; unreadable files fail with a single error.
pub fn validate_file(
    path: &Path,
    index: &dyn SlugIndex,
    options: ValidationOptions,
) -> ValidationOutcome {
    let expected = store::storage_key(path).unwrap_or_default();
    match store::load_document(path) {
        Some(doc) => {
            let outcome = validate_record(&doc, &expected, index, options);
            debug!(
                slug = %expected,
                passed = outcome.passed,
                errors = outcome.errors.len(),
                warnings = outcome.warnings.len(),
                "validated record"
            );
            outcome
        }
        None => ValidationOutcome::failed(vec![LOAD_FAILURE.to_string()]),
    }
}

/// Validate every file, keyed by file name in input order.
pub fn validate_all(
    files: &[PathBuf],
    index: &dyn SlugIndex,
    options: ValidationOptions,
) -> IndexMap<String, ValidationOutcome> {
    files
        .iter()
        .map(|path| (store::file_name(path), validate_file(path, index, options)))
        .collect()
}
