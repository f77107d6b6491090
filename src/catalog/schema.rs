//! Field rules for catalog work records.

use regex::Regex;

use super::CatalogValue;

/// Whether a field may hold more than one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    Single,
    Multiple,
    /// One value per language when the work has several languages.
    PerLanguage,
    /// An ISBN-10 and ISBN-13 pair for the same edition.
    IsbnPair,
}

impl Multiplicity {
    /// Input for any field that can ever hold several values is split on
    /// `"; "`; whether that many values are allowed is checked afterwards.
    pub fn splits(&self) -> bool {
        *self != Multiplicity::Single
    }
}

#[derive(Clone, Copy)]
pub enum Format {
    OneOf(&'static [&'static str]),
    Pattern(fn() -> &'static Regex),
    Check(&'static str, fn(&str) -> bool),
}

impl Format {
    /// Explain why a value does not match, or None if it does.
    pub fn reject(&self, value: &str) -> Option<String> {
        match self {
            Format::OneOf(allowed) => {
                if allowed.contains(&value) {
                    None
                } else {
                    Some(format!(
                        "The value \"{}\" is not included: {}",
                        value,
                        allowed.join(", ")
                    ))
                }
            }
            Format::Pattern(pattern) => {
                let re = pattern();
                if re.is_match(value) {
                    None
                } else {
                    Some(format!(
                        "The value \"{}\" does not conform to pattern: {}",
                        value,
                        re.as_str()
                    ))
                }
            }
            Format::Check(name, check) => {
                if check(value) {
                    None
                } else {
                    Some(format!(
                        "The value \"{}\" does not conform to pattern: {}",
                        value, name
                    ))
                }
            }
        }
    }
}

#[derive(Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub required: bool,
    pub multiple: Multiplicity,
    pub format: Option<Format>,
}

const fn field(name: &'static str, required: bool, multiple: Multiplicity) -> Field {
    Field {
        name,
        required,
        multiple,
        format: None,
    }
}

const fn formatted(
    name: &'static str,
    required: bool,
    multiple: Multiplicity,
    format: Format,
) -> Field {
    Field {
        name,
        required,
        multiple,
        format: Some(format),
    }
}

const ENTRY_TYPES: &[&str] = &["print", "online", "cd", "application"];
const KEY_TYPES: &[&str] = &[
    "key",
    "matrix",
    "reference",
    "gallery",
    "checklist",
    "supplement",
    "collection",
    "algorithm",
];
const BOOLEANS: &[&str] = &["TRUE", "FALSE"];

fn work_id() -> &'static Regex {
    compile!(r"^B[1-9]\d*$")
}

fn edtf_level_0() -> &'static Regex {
    compile!(
        r"^(\d{4}(-\d{2}(-\d{2}(T\d{2}:\d{2}:\d{2}(Z|[-+]\d{2}(:\d{2})?))?)?)?|\d{4}(-\d{2}(-\d{2})?)?/(\d{4}(-\d{2}(-\d{2})?)?|\.\.))$"
    )
}

fn issn_l() -> &'static Regex {
    compile!(r"^[0-9]{4}-[0-9]{3}[0-9X]$")
}

fn isbn() -> &'static Regex {
    compile!(r"^(\d{13}|\d{9}[0-9X])$")
}

fn doi() -> &'static Regex {
    compile!(r"^10\.")
}

fn qid() -> &'static Regex {
    compile!(r"^Q[1-9][0-9]*$")
}

fn url() -> &'static Regex {
    compile!(
        r#"(?i)^(ftp|http|https)://((?:[a-z0-9][a-z0-9\-_]*?[a-z0-9]?\.)+(?:xn--)?[a-z0-9]+)(:\d*)?((?:/(?:%\d\d|[!$&'()*+,\-.0-9";=@A-Z_a-z~])*)*)(\?(?:%\d\d|[!$&'()*+,\-./0-9:;=?@A-Z_a-z~])*)?(#(?:%\d\d|[!$&'()*+,\-./0-9:;=?@A-Z_a-z~])*)?"#
    )
}

fn is_license(value: &str) -> bool {
    compile!(r"^<(public domain|.+\?)>$").is_match(value)
        || compile!(r"^[A-Za-z0-9][A-Za-z0-9.+-]*(?: (?:AND|OR|WITH) [A-Za-z0-9][A-Za-z0-9.+-]*)*$")
            .is_match(value)
}

fn is_language(value: &str) -> bool {
    compile!(r"^(?i:[a-z]{2,3}(?:-[a-z]{3}){0,3}(?:-[a-z]{4})?(?:-(?:[a-z]{2}|\d{3}))?(?:-(?:[a-z0-9]{5,8}|\d[a-z0-9]{3}))*)$")
        .is_match(value)
}

pub const WORK: &[Field] = &[
    formatted("id", true, Multiplicity::Single, Format::Pattern(work_id)),
    field("title", true, Multiplicity::PerLanguage),
    field("author", false, Multiplicity::Multiple),
    formatted("url", false, Multiplicity::Multiple, Format::Pattern(url)),
    formatted("fulltext_url", false, Multiplicity::Multiple, Format::Pattern(url)),
    formatted("archive_url", false, Multiplicity::Multiple, Format::Pattern(url)),
    formatted("entry_type", true, Multiplicity::Single, Format::OneOf(ENTRY_TYPES)),
    formatted("date", false, Multiplicity::Single, Format::Pattern(edtf_level_0)),
    field("publisher", false, Multiplicity::Multiple),
    field("series", false, Multiplicity::Single),
    formatted("ISSN", false, Multiplicity::Single, Format::Pattern(issn_l)),
    formatted("ISBN", false, Multiplicity::IsbnPair, Format::Pattern(isbn)),
    formatted("DOI", false, Multiplicity::Single, Format::Pattern(doi)),
    formatted("QID", false, Multiplicity::Single, Format::Pattern(qid)),
    field("volume", false, Multiplicity::Single),
    field("issue", false, Multiplicity::Single),
    field("pages", false, Multiplicity::Single),
    field("edition", false, Multiplicity::Single),
    formatted(
        "language",
        true,
        Multiplicity::Multiple,
        Format::Check("LANGUAGE", is_language),
    ),
    formatted(
        "license",
        false,
        Multiplicity::Multiple,
        Format::Check("LICENSE", is_license),
    ),
    formatted("key_type", true, Multiplicity::Multiple, Format::OneOf(KEY_TYPES)),
    field("taxon", true, Multiplicity::Multiple),
    field("taxon_scope", false, Multiplicity::Multiple),
    field("scope", false, Multiplicity::Multiple),
    field("region", true, Multiplicity::Multiple),
    formatted("complete", false, Multiplicity::Single, Format::OneOf(BOOLEANS)),
    field("target_taxa", false, Multiplicity::Multiple),
    formatted("listed_in", false, Multiplicity::Multiple, Format::Pattern(work_id)),
    formatted("part_of", false, Multiplicity::Multiple, Format::Pattern(work_id)),
    formatted("version_of", false, Multiplicity::Multiple, Format::Pattern(work_id)),
    formatted("duplicate_of", false, Multiplicity::Single, Format::Pattern(work_id)),
];

pub fn lookup(name: &str) -> Option<&'static Field> {
    WORK.iter()
        .find(|field| field.name == name)
}

/// Decide whether the values present in `field` are allowed given the rest
/// of the record.
pub fn allows_multiple(
    multiple: Multiplicity,
    language: Option<&CatalogValue>,
    isbn: Option<&CatalogValue>,
) -> bool {
    match multiple {
        Multiplicity::Single => false,
        Multiplicity::Multiple => true,
        Multiplicity::PerLanguage => matches!(language, Some(CatalogValue::Multiple(values)) if values.len() > 1),
        Multiplicity::IsbnPair => match isbn {
            Some(CatalogValue::Multiple(values)) if values.len() == 2 => {
                let first = values[0].len();
                let second = values[1].len();
                (first == 10 && second == 13) || (first == 13 && second == 10)
            }
            _ => false,
        },
    }
}
