// src/query/field.rs
//
// Dotted field specifiers: `id`, `school.name`, `latest.student.size`,
// `2013.cost.tuition.in_state`. No schema check; whatever the caller writes
// goes to the server, and unknown names just come back without a column.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Period {
    Latest,
    Year(u16),
}

impl Period {
    fn parse(seg: &str) -> Option<Self> {
        if seg == "latest" {
            return Some(Period::Latest);
        }
        if seg.len() == 4 && seg.bytes().all(|b| b.is_ascii_digit()) {
            return seg.parse().ok().map(Period::Year);
        }
        None
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Latest => f.write_str("latest"),
            Period::Year(y) => write!(f, "{y}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldSpec {
    /// Root category: no year, no category (`id`, `ope8_id`).
    Root(String),
    /// `school.<field>`; school fields carry no year.
    School(String),
    /// `<period>.<category>.<field>`; `field` may itself contain dots.
    Dated { period: Period, category: String, field: String },
    /// Anything else, passed through verbatim.
    Other(String),
}

impl FieldSpec {
    pub fn root(name: &str) -> Self {
        FieldSpec::Root(s!(name))
    }

    pub fn school(field: &str) -> Self {
        FieldSpec::School(s!(field))
    }

    pub fn latest(category: &str, field: &str) -> Self {
        FieldSpec::Dated { period: Period::Latest, category: s!(category), field: s!(field) }
    }

    pub fn year(year: u16, category: &str, field: &str) -> Self {
        FieldSpec::Dated { period: Period::Year(year), category: s!(category), field: s!(field) }
    }

    /// Classify a dotted string. Never fails.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        let mut parts = spec.splitn(3, '.');
        let first = parts.next().unwrap_or("");
        let second = parts.next();
        let rest = parts.next();

        match (first, second, rest) {
            (name, None, _) if !name.is_empty() => FieldSpec::Root(s!(name)),
            ("school", Some(_), _) => FieldSpec::School(s!(&spec["school.".len()..])),
            (p, Some(cat), Some(field)) if !cat.is_empty() && !field.is_empty() => {
                match Period::parse(p) {
                    Some(period) => FieldSpec::Dated { period, category: s!(cat), field: s!(field) },
                    None => FieldSpec::Other(s!(spec)),
                }
            }
            _ => FieldSpec::Other(s!(spec)),
        }
    }

    pub fn period(&self) -> Option<Period> {
        match self {
            FieldSpec::Dated { period, .. } => Some(*period),
            _ => None,
        }
    }
}

impl From<&str> for FieldSpec {
    fn from(s: &str) -> Self {
        FieldSpec::parse(s)
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSpec::Root(name) => f.write_str(name),
            FieldSpec::School(field) => write!(f, "school.{field}"),
            FieldSpec::Dated { period, category, field } => write!(f, "{period}.{category}.{field}"),
            FieldSpec::Other(raw) => f.write_str(raw),
        }
    }
}

/// Split a `a,b,c` list from the command line; blanks dropped, order kept.
pub fn parse_field_list(list: &str) -> Vec<FieldSpec> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(FieldSpec::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_dotted_specs() {
        assert_eq!(FieldSpec::parse("id"), FieldSpec::root("id"));
        assert_eq!(FieldSpec::parse("school.name"), FieldSpec::school("name"));
        assert_eq!(
            FieldSpec::parse("latest.student.size"),
            FieldSpec::latest("student", "size")
        );
        assert_eq!(
            FieldSpec::parse("2013.cost.tuition.in_state"),
            FieldSpec::year(2013, "cost", "tuition.in_state")
        );
        assert!(matches!(FieldSpec::parse("nonsense.thing"), FieldSpec::Other(_)));
    }

    #[test]
    fn display_reproduces_input() {
        for raw in ["id", "school.name", "latest.student.size", "2013.cost.tuition.in_state", "x.y"] {
            assert_eq!(FieldSpec::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn field_list_keeps_order() {
        let v = parse_field_list("school.name, id,,latest.student.size");
        let names: Vec<String> = v.iter().map(|f| f.to_string()).collect();
        assert_eq!(names, ["school.name", "id", "latest.student.size"]);
    }
}
