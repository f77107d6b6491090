//! Grammar for a single name line of a key: status marker, cluster tag,
//! scientific name, authorship and remarks.

use std::fmt;

use crate::language::{Cluster, NameParts, Rank, TaxonomicStatus, WorkingTaxon};

pub const HYBRID_SIGN: char = '\u{00D7}';

/// What a name line can inherit from the taxon it is nested under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub rank: Option<Rank>,
    pub genus: Option<String>,
    pub subgenus: Option<String>,
    pub specific_epithet: Option<String>,
    /// Genus and epithet as they were written before a correction, which is
    /// how they still appear in the lines below.
    pub written_genus: Option<String>,
    pub written_specific_epithet: Option<String>,
}

impl From<&WorkingTaxon> for Context {
    fn from(parent: &WorkingTaxon) -> Context {
        let incorrect = parent
            .incorrect
            .as_deref();

        Context {
            rank: parent.rank,
            genus: parent
                .classification
                .get(Rank::Genus)
                .map(str::to_string),
            subgenus: parent
                .classification
                .get(Rank::Subgenus)
                .map(str::to_string),
            specific_epithet: parent
                .name
                .specific_epithet
                .clone(),
            written_genus: incorrect.and_then(|taxon| {
                taxon
                    .classification
                    .get(Rank::Genus)
                    .map(str::to_string)
            }),
            written_specific_epithet: incorrect.and_then(|taxon| {
                taxon
                    .name
                    .specific_epithet
                    .clone()
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    Unparseable(String),
    UnexpectedCharacters(String),
    NotCapitalized(Rank, String),
    GenericNotCapitalized(String),
    InfragenericNotCapitalized(String),
    GroupNotLowercase(String),
    SubgroupNotLowercase(String),
    NotLowercase(String),
    SpecificNotLowercase(String),
    InfraspecificNotLowercase(String),
}

impl NameError {
    /// Whether the line produced nothing usable at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NameError::Unparseable(_))
    }
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Unparseable(name) => write!(f, "Taxon \"{}\" could not be parsed", name),
            NameError::UnexpectedCharacters(name) => {
                write!(f, "Taxon name contains unexpected characters: \"{}\"", name)
            }
            NameError::NotCapitalized(rank, name) => {
                write!(f, "Taxon name ({}) should be capitalized: \"{}\"", rank, name)
            }
            NameError::GenericNotCapitalized(name) => {
                write!(f, "Generic epithet should be capitalized: \"{}\"", name)
            }
            NameError::InfragenericNotCapitalized(name) => {
                write!(f, "Infrageneric epithet should be capitalized: \"{}\"", name)
            }
            NameError::GroupNotLowercase(name) => {
                write!(f, "Group name should be lowercase: \"{}\"", name)
            }
            NameError::SubgroupNotLowercase(name) => {
                write!(f, "Subgroup name should be lowercase: \"{}\"", name)
            }
            NameError::NotLowercase(name) => write!(f, "Taxon name should be lowercase: \"{}\"", name),
            NameError::SpecificNotLowercase(name) => {
                write!(f, "Specific epithet should be lowercase: \"{}\"", name)
            }
            NameError::InfraspecificNotLowercase(name) => {
                write!(f, "Infraspecific epithet should be lowercase: \"{}\"", name)
            }
        }
    }
}

/// Result of parsing one name line. A recovered draft is complete enough to
/// serve as the parent of the lines below it, but the problems still make
/// the key invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameOutcome {
    Complete(WorkingTaxon),
    Recovered(WorkingTaxon, Vec<NameError>),
    Failed(NameError),
}

impl NameOutcome {
    pub fn draft(&self) -> Option<&WorkingTaxon> {
        match self {
            NameOutcome::Complete(draft) => Some(draft),
            NameOutcome::Recovered(draft, _) => Some(draft),
            NameOutcome::Failed(_) => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, NameOutcome::Complete(_))
    }
}

// genus, optional (subgenus), then a specific epithet: plain, hybrid
// formula, or intergeneric formula written with underscores
const BINAME: &str = r"^(?:((?:x )?[A-Z]\S+) (?:\(([A-Z]\S+?)\) )?)?(x [a-z-]+|[a-z-][^\s.]+(?: x [a-z-]+)?|[A-Z][a-z]+_[a-z-]+ x [A-Z][a-z]+_[a-z-]+)(?: |$)";

const SUBGENUS: &str = r"^([A-Z]\S+) \(([A-Z]\S+?)\)(?: |$)";

/// Parse a name line (without its indentation) at the rank its depth gives
/// it, in the context of its nearest parent.
pub fn parse_name(line: &str, rank: Rank, parent: &Context) -> NameOutcome {
    let mut item = WorkingTaxon::default();
    let mut name = line;
    let mut rank = rank;

    // status marker; synonyms are written in full so their shape says more
    // about their rank than their indentation does
    let is_synonym = compile!(r"^[+=>] ").is_match(name);
    if is_synonym {
        item.status = name
            .chars()
            .next()
            .and_then(TaxonomicStatus::from_symbol)
            .unwrap_or_default();
        name = strip(name, compile!(r"^[+=>] (?:\? ?)?"));
        rank = synonym_rank(name, parent.rank.unwrap_or(rank));
    }

    if let Some(captures) = compile!(r"^\[(_|\d+)\] ").captures(name) {
        item.cluster = match &captures[1] {
            "_" => Some(Cluster::Unidentifiable),
            n => n
                .parse()
                .ok()
                .map(Cluster::Numbered),
        };
        name = &name[captures[0].len()..];
    }

    item.verbatim_identification = Some(
        name.split(' ')
            .map(|word| if word == "x" { "\u{00D7}" } else { word })
            .collect::<Vec<_>>()
            .join(" ")
            .replace('_', " "),
    );

    let context = derive_context(name, rank, is_synonym, parent);
    let name = strip_prefixes(name, rank, &context);
    let name = normalize_hybrid(name, rank);

    let Some((taxon, citation, remarks)) = split_name(&name) else {
        return NameOutcome::Failed(NameError::Unparseable(name));
    };

    let authorship = capitalize_authors(&citation);
    item.authorship = if authorship.is_empty() {
        None
    } else {
        Some(authorship)
    };
    item.remarks = remarks;
    item.rank = Some(rank);

    let mut problems = Vec::new();

    if compile!(r"[^\p{L}0-9\x{00D7}\- ]").is_match(&taxon) {
        problems.push(NameError::UnexpectedCharacters(taxon.clone()));
    }

    let (name_only, parts) = compose(&taxon, rank, &context, &mut problems);
    item.name = parts;
    item.scientific_name = Some(match &item.authorship {
        Some(authorship) => format!("{} {}", name_only, authorship),
        None => name_only.clone(),
    });
    item.scientific_name_only = Some(name_only);

    if problems.is_empty() {
        NameOutcome::Complete(item)
    } else {
        NameOutcome::Recovered(item, problems)
    }
}

fn strip<'a>(name: &'a str, re: &regex::Regex) -> &'a str {
    match re.find(name) {
        Some(found) => &name[found.end()..],
        None => name,
    }
}

fn synonym_rank(name: &str, fallback: Rank) -> Rank {
    let biname = compile!(BINAME).captures(name);
    let rest = match &biname {
        Some(captures) => captures
            .get(3)
            .map(|epithet| &name[epithet.end()..])
            .unwrap_or(name),
        None => name,
    };

    if let Some(prefix) = compile!(r"^ ?(st|r|ab|f|var|ssp|subsp)\. ").captures(rest) {
        if let Some(rank) = Rank::from_label(&prefix[1]) {
            return rank;
        }
    }

    if biname.is_none() {
        if compile!(SUBGENUS).is_match(name) {
            Rank::Subgenus
        } else {
            fallback
        }
    } else if compile!(r"^ [a-z0-9-]+(?:$| )").is_match(rest) && !rest[1..].starts_with("sensu") {
        Rank::Subspecies
    } else {
        Rank::Species
    }
}

/// Fold the genus, subgenus and specific epithet written on the line into
/// the parent context when the line spells out its full name: synonyms, and
/// lines with no parent to take those parts from.
fn derive_context(name: &str, rank: Rank, is_synonym: bool, parent: &Context) -> Context {
    let mut context = parent.clone();

    let derive = is_synonym
        || context
            .genus
            .is_none()
        || (rank > Rank::Species
            && context
                .specific_epithet
                .is_none());
    if !derive {
        return context;
    }

    let Some(captures) = compile!(BINAME)
        .captures(name)
        .or_else(|| compile!(SUBGENUS).captures(name))
    else {
        return context;
    };

    let genus = captures.get(1);
    if let Some(genus) = genus {
        let genus = genus.as_str();
        context.written_genus = Some(genus.to_string());
        context.genus = Some(capitalize_generic_name(&replace_hybrid_marker(genus)));
    }

    match captures.get(2) {
        Some(subgenus) => context.subgenus = Some(capitalize(subgenus.as_str())),
        None if genus.is_some() => context.subgenus = None,
        None => {}
    }

    if let Some(species) = captures.get(3) {
        if rank > Rank::Species {
            let species = species.as_str();
            context.written_specific_epithet = Some(species.to_string());
            context.specific_epithet = Some(replace_hybrid_marker(species));
        }
    }

    context
}

/// Remove the parts of the name that the parent already provides, so that
/// only the epithet of this rank is left.
fn strip_prefixes(name: &str, rank: Rank, context: &Context) -> String {
    let genus = context
        .written_genus
        .as_deref()
        .or(context.genus.as_deref())
        .unwrap_or_default();

    if rank >= Rank::Group {
        let name = strip_genus(name, genus, " ");
        let name = strip(name, compile!(r"^\(.*?\) "));

        if rank > Rank::Species {
            let species = context
                .written_specific_epithet
                .as_deref()
                .or(context.specific_epithet.as_deref())
                .unwrap_or_default();
            let name = name
                .strip_prefix(species)
                .and_then(|rest| rest.strip_prefix(' '))
                .unwrap_or(name);

            strip(name, compile!(r"^(?:st|r|ab|f|var|ssp|subsp)\. ")).to_string()
        } else {
            name.to_string()
        }
    } else if rank >= Rank::Genus {
        let name = strip_genus(name, genus, " (");
        compile!(r"^\((.*?)\)")
            .replace(name, "$1")
            .into_owned()
    } else {
        name.to_string()
    }
}

fn strip_genus<'a>(name: &'a str, genus: &str, separator: &str) -> &'a str {
    let Some(first) = genus.chars().next() else {
        return name;
    };

    if !name.starts_with(first) {
        return name;
    }

    let prefix = format!("{}{}", genus.to_lowercase(), separator);
    if name
        .to_lowercase()
        .starts_with(&prefix)
    {
        name.get(genus.len() + 1..)
            .unwrap_or(name)
    } else {
        name
    }
}

fn normalize_hybrid(name: String, rank: Rank) -> String {
    match rank {
        Rank::Genus => match name.strip_prefix("x ") {
            Some(rest) => format!("{}{}", HYBRID_SIGN, rest),
            None => name,
        },
        Rank::Species => replace_hybrid_marker(&name),
        _ => name,
    }
}

/// Replace the first stand-alone `x ` (and the space before it) with the
/// hybrid sign.
fn replace_hybrid_marker(name: &str) -> String {
    compile!(r"(?:^| )x ")
        .replace(name, "\u{00D7}")
        .into_owned()
}

/// Split a name into the name itself, the author citation, and remarks.
fn split_name(name: &str) -> Option<(String, String, Option<String>)> {
    let first = name
        .find(char::is_whitespace)
        .unwrap_or(name.len());
    let excluded = name[first..]
        .strip_prefix(' ')
        .is_some_and(|rest| {
            compile!(r"^(?:auctt?\.|(?:syn|comb|sp|spec|nom|gen|subgen)\. n(?:ov)?\.|s(?:ens[.u]|\.)|in part|partim)")
                .is_match(rest)
        });

    let captures = if excluded {
        compile!(r"^(\S+)(?:,? (.+))?$").captures(name)?
    } else {
        compile!(
            r"^(\S+)(?: (\(.+?\)(?:\s+(?:(?:\p{Lu}\S*|&|in|ex|y|der|den|de|van|von)\s*)*\p{Lu}\S+(?:\s+et\s+al\.)?)?|.+?\d{4}\)?|(?:(?:\p{Lu}\S*|&|in|ex|y|der|den|de|van|von)\s*)*\p{Lu}\S+(?:\s+et\s+al\.)?))?(?:,? (.+))?$"
        )
        .captures(name)?
    };

    let taxon = captures[1].replace('_', " ");
    let (citation, remarks) = if excluded {
        (None, captures.get(2))
    } else {
        (captures.get(2), captures.get(3))
    };

    Some((
        taxon,
        citation
            .map(|citation| citation.as_str().to_string())
            .unwrap_or_default(),
        remarks.map(|remarks| remarks.as_str().to_string()),
    ))
}

/// Validate the epithet for its rank and compose the full name without
/// authorship.
fn compose(
    taxon: &str,
    rank: Rank,
    context: &Context,
    problems: &mut Vec<NameError>,
) -> (String, NameParts) {
    let mut parts = NameParts::default();
    let lowercase = taxon.to_lowercase();

    if rank < Rank::Genus {
        if !starts_uppercase(taxon) {
            problems.push(NameError::NotCapitalized(rank, taxon.to_string()));
        }
        return (capitalize(taxon), parts);
    }

    if rank == Rank::Genus {
        let mut chars = taxon.chars();
        let hybrid = chars.next() == Some(HYBRID_SIGN);
        if !starts_uppercase(taxon) || (hybrid && !starts_uppercase(chars.as_str())) {
            problems.push(NameError::GenericNotCapitalized(taxon.to_string()));
        }
        return (capitalize_generic_name(taxon), parts);
    }

    parts.generic_name = context
        .genus
        .clone();
    parts.infrageneric_epithet = context
        .subgenus
        .clone();

    let name = match rank {
        _ if rank < Rank::Group => {
            if !starts_uppercase(taxon) {
                problems.push(NameError::InfragenericNotCapitalized(taxon.to_string()));
            }
            capitalize(taxon)
        }
        Rank::Group | Rank::Subgroup => {
            let suffix = if rank == Rank::Group { "-group" } else { "-subgroup" };
            if lowercase != taxon {
                problems.push(if rank == Rank::Group {
                    NameError::GroupNotLowercase(taxon.to_string())
                } else {
                    NameError::SubgroupNotLowercase(taxon.to_string())
                });
            }
            let epithet = lowercase
                .strip_suffix(suffix)
                .unwrap_or(&lowercase);
            join(&[
                parts
                    .generic_name
                    .as_deref(),
                Some(format!("{}{}", epithet, suffix).as_str()),
            ])
        }
        _ if rank < Rank::Species => {
            if lowercase != taxon {
                problems.push(NameError::NotLowercase(taxon.to_string()));
            }
            join(&[
                parts
                    .generic_name
                    .as_deref(),
                Some(lowercase.as_str()),
            ])
        }
        Rank::Species => {
            let intergeneric = compile!(r"^[A-Z][a-z]+ [a-z]+\x{00D7}[A-Z][a-z]+ [a-z]+$").is_match(taxon);
            if lowercase != taxon && !intergeneric {
                problems.push(NameError::SpecificNotLowercase(taxon.to_string()));
            }
            parts.specific_epithet = Some(taxon.to_string());
            join(&[
                parts
                    .generic_name
                    .as_deref(),
                Some(taxon),
            ])
        }
        _ => {
            if lowercase != taxon {
                problems.push(NameError::InfraspecificNotLowercase(taxon.to_string()));
            }
            parts.specific_epithet = context
                .specific_epithet
                .clone();
            parts.infraspecific_epithet = Some(lowercase.clone());
            join(&[
                parts
                    .generic_name
                    .as_deref(),
                parts
                    .specific_epithet
                    .as_deref(),
                rank.label(),
                Some(lowercase.as_str()),
            ])
        }
    };

    (name, parts)
}

fn join(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn starts_uppercase(name: &str) -> bool {
    match name.chars().next() {
        Some(first) => first
            .to_uppercase()
            .eq(std::iter::once(first)),
        None => true,
    }
}

pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn capitalize_generic_name(name: &str) -> String {
    match name.strip_prefix(HYBRID_SIGN) {
        Some(rest) => format!("{}{}", HYBRID_SIGN, capitalize(rest)),
        None => capitalize(name),
    }
}

/// Authors written in capitals are recapitalized; the Spanish "y" between
/// two authors stays lowercase.
fn capitalize_authors(authors: &str) -> String {
    compile!(r"[^\x00-\x40\x5B-\x60\x7B-\x7F]+")
        .replace_all(authors, |captures: &regex::Captures| {
            let word = &captures[0];
            if word.to_uppercase() == word {
                capitalize(word)
            } else {
                word.to_string()
            }
        })
        .replace(" Y ", " y ")
}
