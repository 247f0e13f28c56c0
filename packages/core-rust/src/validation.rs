/// Declarative description of a single operation field for required-field checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Name of the field as reported in validation errors.
    pub name: &'static str,
    /// Whether the field must be present for the operation to be valid.
    pub required: bool,
    /// Whether the field currently holds a value.
    pub present: bool,
}

impl FieldDef {
    /// A field that must be set.
    #[must_use]
    pub fn required(name: &'static str, present: bool) -> Self {
        Self {
            name,
            required: true,
            present,
        }
    }

    /// A field that may be left unset.
    #[must_use]
    pub fn optional(name: &'static str, present: bool) -> Self {
        Self {
            name,
            required: false,
            present,
        }
    }
}

/// Accumulates validation failures.
///
/// Starts valid; every [`add_error`](Self::add_error) flips it to invalid. All
/// violations are collected so a caller can report them together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Appends every failure from `other`.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Appends every failure from `other`, prefixing each with `prefix`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationResult) {
        self.errors
            .extend(other.errors.into_iter().map(|e| format!("{prefix}{e}")));
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// All failures joined into a single human-readable line.
    #[must_use]
    pub fn error_string(&self) -> String {
        self.errors.join("; ")
    }
}

/// Checks that every required field in `fields` is present.
#[must_use]
pub fn validate_required(type_name: &str, fields: &[FieldDef]) -> ValidationResult {
    let mut result = ValidationResult::new();
    for field in fields.iter().filter(|f| f.required && !f.present) {
        result.add_error(format!("{} is required for: {type_name}", field.name));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_valid_and_flips_on_error() {
        let mut result = ValidationResult::new();
        assert!(result.is_valid());

        result.add_error("first");
        result.add_error("second");
        assert!(!result.is_valid());
        assert_eq!(result.errors(), ["first", "second"]);
        assert_eq!(result.error_string(), "first; second");
    }

    #[test]
    fn merge_prefixed_keeps_all_errors() {
        let mut outer = ValidationResult::new();
        let mut inner = ValidationResult::new();
        inner.add_error("bad");
        outer.merge_prefixed("stage 1: ", inner);
        assert_eq!(outer.into_errors(), vec!["stage 1: bad".to_string()]);
    }

    #[test]
    fn required_fields_report_every_missing_field() {
        let fields = [
            FieldDef::required("operations", false),
            FieldDef::required("input", true),
            FieldDef::optional("view", false),
            FieldDef::required("storeProperties", false),
        ];
        let result = validate_required("Path", &fields);
        assert_eq!(
            result.errors(),
            [
                "operations is required for: Path",
                "storeProperties is required for: Path"
            ]
        );
    }
}
