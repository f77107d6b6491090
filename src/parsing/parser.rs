//! Reading the content lines of one resource into taxa, carrying identifiers
//! over from an earlier revision where the lines allow it.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::diffing::{self, DiffKind};
use crate::language::{Cluster, Flag, Rank, Resource, Taxon, TaxonMap, WorkingTaxon};
use crate::parsing::header::HeaderError;
use crate::parsing::names::{self, Context, NameError, NameOutcome};
use crate::parsing::scope::Ancestry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    InvalidHeader(usize, HeaderError),
    OddIndentation(usize),
    TooMuchIndentation(usize),
    MissingLeafTaxon(usize),
    InvalidName(usize, NameError),
    NothingToCorrect(usize),
    AlreadyCorrected(usize),
}

impl ParsingError {
    pub fn offset(&self) -> usize {
        match self {
            ParsingError::InvalidHeader(offset, _) => *offset,
            ParsingError::OddIndentation(offset) => *offset,
            ParsingError::TooMuchIndentation(offset) => *offset,
            ParsingError::MissingLeafTaxon(offset) => *offset,
            ParsingError::InvalidName(offset, _) => *offset,
            ParsingError::NothingToCorrect(offset) => *offset,
            ParsingError::AlreadyCorrected(offset) => *offset,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ParsingError::InvalidHeader(_, problem) => problem.to_string(),
            ParsingError::OddIndentation(_) => {
                "Indentation should be a multiple of two spaces".to_string()
            }
            ParsingError::TooMuchIndentation(_) => "Too much indentation".to_string(),
            ParsingError::MissingLeafTaxon(_) => "Missing leaf taxon".to_string(),
            ParsingError::InvalidName(_, problem) => problem.to_string(),
            ParsingError::NothingToCorrect(_) => "Correction without a taxon to correct".to_string(),
            ParsingError::AlreadyCorrected(_) => "Taxon was already corrected".to_string(),
        }
    }

    /// Header problems are about the block as a whole, not a position in it.
    pub fn has_column(&self) -> bool {
        !matches!(self, ParsingError::InvalidHeader(..))
    }
}

const UNIT: usize = 2;

const PLACEHOLDERS: [&str; 5] = [" sp.", " spec.", " indet.", " sp. indet.", " spec. indet."];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Blank,
    Placeholder,
    Correction,
    Synonym,
    Accepted,
}

#[derive(Debug, Clone, Copy)]
struct Line<'i> {
    indent: usize,
    content: &'i str,
    kind: Kind,
}

impl<'i> Line<'i> {
    fn read(text: &'i str) -> Line<'i> {
        let text = text.trim_end();
        let content = text.trim_start_matches(' ');
        let indent = text.len() - content.len();

        let kind = if content.is_empty() {
            Kind::Blank
        } else if content == "[indet]"
            || PLACEHOLDERS
                .iter()
                .any(|suffix| content.ends_with(suffix))
        {
            Kind::Placeholder
        } else if content.starts_with("> ") {
            Kind::Correction
        } else if content.starts_with("= ") || content.starts_with("+ ") {
            Kind::Synonym
        } else {
            Kind::Accepted
        };

        Line {
            indent,
            content,
            kind,
        }
    }

    fn depth(&self) -> usize {
        self.indent / UNIT
    }

    fn is_status(&self) -> bool {
        matches!(self.kind, Kind::Correction | Kind::Synonym)
    }

    /// Lines that are given an identifier of their own.
    fn holds_taxon(&self) -> bool {
        matches!(self.kind, Kind::Synonym | Kind::Accepted)
    }
}

/// Builds the taxa of one resource. Taxa live in an arena in line order so
/// that a correction can amend the taxon it belongs to by index.
pub(crate) struct ResourceParser<'i> {
    resource: Resource,
    content: &'i str,
    offset: usize,
    old_ids: &'i [u32],
    arena: Vec<WorkingTaxon>,
    pending: HashMap<usize, Vec<ParsingError>>,
    errors: Vec<ParsingError>,
    ancestry: Ancestry,
    previous: Option<usize>,
    slot: usize,
    counter: u32,
    used: HashSet<u32>,
}

impl<'i> ResourceParser<'i> {
    /// `offset` is where `content` starts within the document, so that
    /// errors point at the right place.
    pub(crate) fn new(resource: Resource, content: &'i str, offset: usize) -> ResourceParser<'i> {
        ResourceParser {
            resource,
            content,
            offset,
            old_ids: &[],
            arena: Vec::new(),
            pending: HashMap::new(),
            errors: Vec::new(),
            ancestry: Ancestry::new(),
            previous: None,
            slot: 0,
            counter: 0,
            used: HashSet::new(),
        }
    }

    /// Read every line of the content. With an earlier revision of the same
    /// content and the numeric identifiers it was given, lines that survived
    /// keep their identifiers and new lines are numbered past all of them.
    pub(crate) fn parse(
        mut self,
        old: Option<&str>,
        old_ids: &'i [u32],
    ) -> Result<Resource, Vec<ParsingError>> {
        self.old_ids = old_ids;
        self.ancestry
            .reset();

        let old_taxa = old
            .map(|text| {
                text.trim_end()
                    .split('\n')
                    .filter(|line| Line::read(line).holds_taxon())
                    .count()
            })
            .unwrap_or(0);
        let highest = old_ids
            .iter()
            .copied()
            .max()
            .unwrap_or(0);
        self.counter = highest.max(old_taxa as u32);

        let lines = self.lines();
        self.check_structure(&lines);

        let parts = match old {
            Some(old) => diffing::diff(old, self.content),
            None => diffing::diff(self.content, self.content),
        };

        let mut next = 0;
        for part in &parts {
            // an added line never takes over a slot, even when it carries text
            // split off an old line; that identifier stays with the old line
            let original = part
                .original
                .as_deref();
            let retired = match part.kind {
                DiffKind::Added => false,
                DiffKind::Deleted => original.map_or(true, |text| Line::read(text).holds_taxon()),
                DiffKind::Unchanged | DiffKind::Modified => {
                    original.is_some_and(|text| Line::read(text).holds_taxon())
                }
            };

            let current = match part.text {
                Some(_) => {
                    let line = lines
                        .get(next)
                        .copied();
                    next += 1;
                    line
                }
                None => None,
            };

            match current {
                Some((offset, line)) => self.read_line(offset, line, retired),
                None => {
                    if retired {
                        self.slot += 1;
                    }
                }
            }
        }

        self.resolve_clusters();
        self.finish()
    }

    fn lines(&self) -> Vec<(usize, Line<'i>)> {
        let mut offset = self.offset;
        let mut lines = Vec::new();
        for text in self
            .content
            .trim_end()
            .split('\n')
        {
            lines.push((offset, Line::read(text)));
            offset += text.len() + 1;
        }
        lines
    }

    fn placement(&self, offset: usize, line: &Line) -> Option<ParsingError> {
        if line.indent % UNIT != 0 {
            return Some(ParsingError::OddIndentation(offset));
        }

        let levels = self
            .resource
            .metadata
            .levels
            .len();
        let limit = match line.kind {
            Kind::Blank => return None,
            Kind::Accepted | Kind::Placeholder => levels,
            Kind::Synonym => levels + 1,
            Kind::Correction => levels + 2,
        };

        if line.depth() >= limit {
            Some(ParsingError::TooMuchIndentation(offset))
        } else {
            None
        }
    }

    /// Indentation problems, and accepted taxa above the leaf rank that have
    /// nothing below them. Deeper synonym and correction lines do not count
    /// as something below; a placeholder does.
    fn check_structure(&mut self, lines: &[(usize, Line)]) {
        for (offset, line) in lines {
            if let Some(error) = self.placement(*offset, line) {
                self.errors
                    .push(error);
            }
        }

        let metadata = &self
            .resource
            .metadata;
        if metadata.has_flag(Flag::MissingLeafTaxa) {
            return;
        }
        let Some(leaf) = metadata
            .levels
            .iter()
            .rposition(Rank::is_main)
        else {
            return;
        };

        let mut open: Option<(usize, usize)> = None;
        for (offset, line) in lines {
            if line.kind == Kind::Blank {
                continue;
            }
            let depth = line.depth();

            if let Some((above, at)) = open {
                if depth > above {
                    if line.is_status() {
                        continue;
                    }
                } else {
                    self.errors
                        .push(ParsingError::MissingLeafTaxon(at));
                }
                open = None;
            }

            if line.kind == Kind::Accepted && depth < leaf {
                open = Some((depth, offset + line.indent));
            }
        }

        if let Some((_, at)) = open {
            self.errors
                .push(ParsingError::MissingLeafTaxon(at));
        }
    }

    /// `retired` says whether the line this one replaces held a taxon, in
    /// which case it takes over that taxon's identifier slot.
    fn read_line(&mut self, offset: usize, line: Line<'i>, retired: bool) {
        let misplaced = self
            .placement(offset, &line)
            .is_some();

        if misplaced || !line.holds_taxon() {
            if retired {
                self.slot += 1;
            }
            if misplaced || matches!(line.kind, Kind::Blank | Kind::Placeholder) {
                return;
            }
        }

        let depth = line.depth();
        self.enter(depth, line.kind == Kind::Correction);

        let parent = self
            .ancestry
            .nearest();
        let context = parent
            .map(|index| Context::from(&self.arena[index]))
            .unwrap_or_default();

        let levels = &self
            .resource
            .metadata
            .levels;
        let Some(rank) = levels
            .get(depth)
            .or(levels.last())
            .copied()
        else {
            return;
        };

        let at = offset + line.indent;
        trace!(line = line.content, ?rank, ?parent);
        let outcome = names::parse_name(line.content, rank, &context);

        if line.kind == Kind::Correction {
            self.correct(parent, outcome, at);
            return;
        }

        let number = self.assign(retired);
        match outcome {
            NameOutcome::Complete(draft) => self.add(draft, number, parent, at, Vec::new()),
            NameOutcome::Recovered(draft, problems) => self.add(draft, number, parent, at, problems),
            NameOutcome::Failed(problem) => {
                self.errors
                    .push(ParsingError::InvalidName(at, problem));
                self.previous = None;
            }
        }
    }

    /// Move the ancestry to `depth`. Going deeper opens a level under the
    /// previous taxon if that taxon can be a parent, and an empty level for
    /// every level skipped.
    fn enter(&mut self, depth: usize, correction: bool) {
        let current = self
            .ancestry
            .depth();

        if depth > current {
            let slot = self
                .previous
                .filter(|&index| correction || self.arena[index].is_accepted());
            self.ancestry
                .push(slot);
            for _ in current + 1..depth {
                self.ancestry
                    .push(None);
            }
        } else if depth < current {
            self.ancestry
                .truncate(depth);
        }
    }

    /// A retired slot hands back the identifier recorded for it, or its own
    /// position when the record is shorter than the old text. Neither may
    /// repeat an identifier already given out in this resource, so those fall
    /// through to the counter like any new line.
    fn assign(&mut self, retired: bool) -> u32 {
        let reused = if retired {
            self.slot += 1;
            match self
                .old_ids
                .get(self.slot - 1)
            {
                Some(&id) => Some(id),
                None => Some(self.slot as u32).filter(|id| !self.old_ids.contains(id)),
            }
        } else {
            None
        };

        let number = match reused.filter(|id| !self.used.contains(id)) {
            Some(id) => id,
            None => loop {
                self.counter += 1;
                if !self.used.contains(&self.counter) {
                    break self.counter;
                }
            },
        };
        self.used
            .insert(number);
        number
    }

    fn add(
        &mut self,
        mut taxon: WorkingTaxon,
        number: u32,
        parent: Option<usize>,
        offset: usize,
        problems: Vec<NameError>,
    ) {
        taxon.id = Some(format!("{}:{}", self.resource.id, number));
        taxon.collection_code = Some(
            self.resource
                .id
                .clone(),
        );

        if let Some(parent) = parent.map(|index| &self.arena[index]) {
            if taxon.is_accepted() {
                taxon.parent_id = parent
                    .id
                    .clone();
                taxon.parent_name = parent
                    .scientific_name
                    .clone();
                taxon.higher_classification = match (
                    &parent.higher_classification,
                    &parent.scientific_name_only,
                ) {
                    (Some(trail), Some(name)) => Some(format!("{} | {}", trail, name)),
                    (None, name) => name.clone(),
                    (trail, None) => trail.clone(),
                };
            } else {
                taxon.accepted_id = parent
                    .id
                    .clone();
                taxon.accepted_name = parent
                    .scientific_name
                    .clone();
                taxon.higher_classification = parent
                    .higher_classification
                    .clone();
            }
            taxon.classification = parent
                .classification
                .clone();
        }

        if let (Some(rank), Some(name)) = (taxon.rank, taxon.scientific_name_only.clone()) {
            taxon
                .classification
                .set(rank, name);
        }
        if taxon
            .classification
            .get(Rank::Genus)
            .is_none()
        {
            if let Some(genus) = taxon
                .name
                .generic_name
                .clone()
            {
                taxon
                    .classification
                    .set(Rank::Genus, genus);
            }
        }
        if taxon
            .classification
            .get(Rank::Subgenus)
            .is_none()
        {
            if let Some(subgenus) = taxon
                .name
                .infrageneric_epithet
                .clone()
            {
                taxon
                    .classification
                    .set(Rank::Subgenus, subgenus);
            }
        }

        let index = self
            .arena
            .len();
        self.arena
            .push(taxon);
        self.previous = Some(index);

        if !problems.is_empty() {
            self.pending.insert(
                index,
                problems
                    .into_iter()
                    .map(|problem| ParsingError::InvalidName(offset, problem))
                    .collect(),
            );
        }
    }

    /// Replace the name of the taxon being corrected, keeping what it said
    /// before. Problems found in the replaced name no longer apply.
    fn correct(&mut self, target: Option<usize>, outcome: NameOutcome, offset: usize) {
        let (correction, problems) = match outcome {
            NameOutcome::Complete(draft) => (draft, Vec::new()),
            NameOutcome::Recovered(draft, problems) => (draft, problems),
            NameOutcome::Failed(problem) => {
                self.errors
                    .push(ParsingError::InvalidName(offset, problem));
                return;
            }
        };

        let Some(index) = target else {
            self.errors
                .push(ParsingError::NothingToCorrect(offset));
            return;
        };

        let taxon = &mut self.arena[index];
        if taxon
            .incorrect
            .is_some()
        {
            self.errors
                .push(ParsingError::AlreadyCorrected(offset));
            return;
        }

        let snapshot = taxon.clone();
        taxon.scientific_name = correction.scientific_name;
        taxon.scientific_name_only = correction.scientific_name_only;
        taxon.authorship = correction.authorship;
        taxon.remarks = correction.remarks;
        taxon.rank = correction.rank;
        taxon.name = correction.name;

        if let Some(rank) = snapshot.rank {
            if taxon
                .classification
                .get(rank)
                == snapshot
                    .scientific_name_only
                    .as_deref()
            {
                taxon
                    .classification
                    .remove(rank);
            }
        }
        if let (Some(rank), Some(name)) = (taxon.rank, taxon.scientific_name_only.clone()) {
            taxon
                .classification
                .set(rank, name);
        }
        refresh(taxon, Rank::Genus, snapshot.name.generic_name.as_deref(), |taxon| {
            taxon
                .name
                .generic_name
                .clone()
        });
        refresh(
            taxon,
            Rank::Subgenus,
            snapshot
                .name
                .infrageneric_epithet
                .as_deref(),
            |taxon| {
                taxon
                    .name
                    .infrageneric_epithet
                    .clone()
            },
        );

        taxon.incorrect = Some(Box::new(snapshot));

        self.pending
            .remove(&index);
        self.errors
            .extend(
                problems
                    .into_iter()
                    .map(|problem| ParsingError::InvalidName(offset, problem)),
            );
    }

    /// Cross-reference accepted siblings that share a numbered cluster tag.
    fn resolve_clusters(&mut self) {
        let mut clusters: HashMap<(Option<String>, u32), Vec<usize>> = HashMap::new();

        for (index, taxon) in self
            .arena
            .iter_mut()
            .enumerate()
        {
            match taxon.cluster {
                Some(Cluster::Numbered(n)) if taxon.is_accepted() => clusters
                    .entry((taxon.parent_id.clone(), n))
                    .or_default()
                    .push(index),
                Some(Cluster::Unidentifiable) => taxon.not_identifiable = true,
                _ => {}
            }
        }

        for members in clusters.values() {
            for &index in members {
                let others = members
                    .iter()
                    .filter(|&&other| other != index)
                    .filter_map(|&other| {
                        self.arena[other]
                            .id
                            .clone()
                    })
                    .collect();
                self.arena[index].indistinguishable_from = others;
            }
        }
    }

    fn finish(mut self) -> Result<Resource, Vec<ParsingError>> {
        for problems in self
            .pending
            .into_values()
        {
            self.errors
                .extend(problems);
        }

        if !self
            .errors
            .is_empty()
        {
            self.errors
                .sort_by_key(ParsingError::offset);
            return Err(self.errors);
        }

        let mut taxa = TaxonMap::new();
        for taxon in self.arena {
            match Taxon::try_from(taxon) {
                Ok(taxon) => {
                    if let Err(taxon) = taxa.insert(taxon) {
                        warn!(id = taxon.id(), "Duplicate identifier left out");
                    }
                }
                Err(taxon) => debug!(id = ?taxon.id, "Incomplete taxon left out"),
            }
        }
        self.resource
            .taxa = taxa;

        Ok(self.resource)
    }
}

/// Follow a change of genus or subgenus through the classification, if the
/// entry there was the one the old name gave.
fn refresh<F>(taxon: &mut WorkingTaxon, rank: Rank, before: Option<&str>, after: F)
where
    F: Fn(&WorkingTaxon) -> Option<String>,
{
    let Some(before) = before else {
        return;
    };
    if taxon
        .classification
        .get(rank)
        != Some(before)
    {
        return;
    }

    match after(taxon) {
        Some(name) => taxon
            .classification
            .set(rank, name),
        None => taxon
            .classification
            .remove(rank),
    }
}
