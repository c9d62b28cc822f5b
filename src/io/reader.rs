//! Reader for CARP instance files.
//!
//! The format is line oriented with tab or space separated fields:
//!
//! ```text
//! Name:          example
//! Capacity:      10
//! Depot Node:    1
//! #Required N:   1
//!
//! ReN.    DEMAND  S. COST
//! N2      5       2
//!
//! ReE.    FROM N. TO N.   T. COST DEMAND  S. COST
//! E1      3       4       4       6       1
//!
//! EDGE    FROM N. TO N.   T. COST
//! NrE1    1       2       3
//!
//! ReA.    FROM N. TO N.   T. COST DEMAND  S. COST
//! A1      2       5       3       1       1
//!
//! ARC     FROM N. TO N.   T. COST
//! NrA1    5       1       2
//! ```
//!
//! Lines starting with `#` are comments. A section header switches the
//! meaning of the rows that follow it. Rows that do not parse are skipped
//! with a warning, or rejected in strict mode.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use super::writer::Reference;
use crate::error::ParseError;
use crate::models::{Cost, Demand, Graph, GraphBuilder, Requirement, VertexId};

/// Options for reading instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// Fail on the first malformed row instead of skipping it.
    pub strict: bool,
}

impl ReadOptions {
    /// Lenient reading: malformed rows are logged and skipped.
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Strict reading: malformed rows are errors.
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    RequiredNodes,
    RequiredEdges,
    RequiredArcs,
    Edges,
    Arcs,
}

impl Section {
    fn from_header(line: &str) -> Option<Self> {
        let first = line.split_whitespace().next()?;
        match first {
            "ReN." => Some(Self::RequiredNodes),
            "ReE." => Some(Self::RequiredEdges),
            "ReA." => Some(Self::RequiredArcs),
            "EDGE" => Some(Self::Edges),
            "ARC" => Some(Self::Arcs),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::RequiredNodes => "ReN",
            Self::RequiredEdges => "ReE",
            Self::RequiredArcs => "ReA",
            Self::Edges => "EDGE",
            Self::Arcs => "ARC",
        }
    }
}

/// Reads an instance file into a builder.
///
/// The file is closed before returning. When the file has no `Name:` line
/// the file stem is used as instance name.
///
/// # Errors
///
/// I/O failures, invalid header values, duplicate requirements, and
/// malformed rows in strict mode.
pub fn read_instance(path: impl AsRef<Path>, options: ReadOptions) -> Result<GraphBuilder, ParseError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned());

    let mut parser = InstanceParser::new(options);
    for line in BufReader::new(file).lines() {
        parser.feed(&line?)?;
    }
    if !parser.has_name {
        if let Some(stem) = stem {
            parser.builder.set_name(stem);
        }
    }
    Ok(parser.builder)
}

/// Reads and validates an instance file.
///
/// # Errors
///
/// See [`read_instance`]; validation failures surface as
/// [`ParseError::Instance`].
pub fn load_instance(path: impl AsRef<Path>, options: ReadOptions) -> Result<Graph, ParseError> {
    Ok(read_instance(path, options)?.build()?)
}

/// Parses instance text into a builder.
///
/// # Examples
///
/// ```
/// use u_arc_routing::io::{parse_instance, ReadOptions};
///
/// let text = "Capacity: 10\nDepot Node: 1\nReN. DEMAND S. COST\nN2 5 2\nEDGE FROM TO COST\nNrE1 1 2 3\n";
/// let graph = parse_instance(text, ReadOptions::default()).unwrap().build().unwrap();
/// assert_eq!(graph.num_services(), 1);
/// assert_eq!(graph.capacity(), 10);
/// ```
pub fn parse_instance(text: &str, options: ReadOptions) -> Result<GraphBuilder, ParseError> {
    let mut parser = InstanceParser::new(options);
    for line in text.lines() {
        parser.feed(line)?;
    }
    Ok(parser.builder)
}

struct InstanceParser {
    options: ReadOptions,
    builder: GraphBuilder,
    section: Section,
    line: usize,
    has_name: bool,
}

impl InstanceParser {
    fn new(options: ReadOptions) -> Self {
        Self {
            options,
            builder: GraphBuilder::new(),
            section: Section::Header,
            line: 0,
            has_name: false,
        }
    }

    fn feed(&mut self, raw: &str) -> Result<(), ParseError> {
        self.line += 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        if let Some(section) = Section::from_header(line) {
            debug!(line = self.line, section = section.name(), "entering section");
            self.section = section;
            return Ok(());
        }
        if let Some((key, value)) = line.split_once(':') {
            return self.header(key.trim(), value.trim());
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if self.row(&fields)? {
            Ok(())
        } else {
            self.malformed(line)
        }
    }

    fn header(&mut self, key: &str, value: &str) -> Result<(), ParseError> {
        match key {
            "Name" => {
                self.builder.set_name(value);
                self.has_name = true;
            }
            "Capacity" => {
                let capacity: Demand = value.parse().map_err(|_| ParseError::InvalidHeader {
                    key: "Capacity",
                    value: value.to_string(),
                })?;
                self.builder.set_capacity(capacity);
            }
            "Depot Node" => {
                let depot: VertexId = value.parse().map_err(|_| ParseError::InvalidHeader {
                    key: "Depot Node",
                    value: value.to_string(),
                })?;
                self.builder.set_depot(depot);
            }
            _ => debug!(line = self.line, key, "ignoring header"),
        }
        Ok(())
    }

    /// Applies a data row. `Ok(false)` means the row could not be parsed.
    fn row(&mut self, fields: &[&str]) -> Result<bool, ParseError> {
        match self.section {
            Section::Header => Ok(false),
            Section::RequiredNodes => {
                let Some((vertex, req)) = required_node(fields) else {
                    return Ok(false);
                };
                self.builder.require_vertex(vertex, req)?;
                Ok(true)
            }
            Section::RequiredEdges => {
                let Some(((u, v, cost), req)) = link(fields).zip(requirement(fields, 4)) else {
                    return Ok(false);
                };
                self.builder.add_edge(u, v, cost, Some(req));
                Ok(true)
            }
            Section::RequiredArcs => {
                let label = fields.first().and_then(|l| label_number(l, "A"));
                let Some((((u, v, cost), req), label)) =
                    link(fields).zip(requirement(fields, 4)).zip(label)
                else {
                    return Ok(false);
                };
                self.builder.add_arc(u, v, cost, Some(req), Some(label));
                Ok(true)
            }
            Section::Edges => {
                let Some((u, v, cost)) = link(fields) else {
                    return Ok(false);
                };
                self.builder.add_edge(u, v, cost, None);
                Ok(true)
            }
            Section::Arcs => {
                let Some((u, v, cost)) = link(fields) else {
                    return Ok(false);
                };
                let label = fields.first().and_then(|l| label_number(l, "NrA"));
                self.builder.add_arc(u, v, cost, None, label);
                Ok(true)
            }
        }
    }

    fn malformed(&self, line: &str) -> Result<(), ParseError> {
        if self.options.strict {
            return Err(ParseError::Malformed {
                line: self.line,
                section: self.section.name(),
                content: line.to_string(),
            });
        }
        warn!(
            line = self.line,
            section = self.section.name(),
            content = line,
            "skipping malformed row"
        );
        Ok(())
    }
}

/// `N12 demand service_cost` → `(12, requirement)`.
fn required_node(fields: &[&str]) -> Option<(VertexId, Requirement)> {
    let vertex = fields.first()?.trim_start_matches('N').parse().ok()?;
    Some((vertex, requirement(fields, 1)?))
}

/// `label u v cost ...` → `(u, v, cost)`.
fn link(fields: &[&str]) -> Option<(VertexId, VertexId, Cost)> {
    let u = fields.get(1)?.parse().ok()?;
    let v = fields.get(2)?.parse().ok()?;
    let cost = fields.get(3)?.parse().ok()?;
    Some((u, v, cost))
}

/// `demand service_cost` starting at field `at`.
fn requirement(fields: &[&str], at: usize) -> Option<Requirement> {
    let demand = fields.get(at)?.parse().ok()?;
    let service_cost = fields.get(at + 1)?.parse().ok()?;
    Some(Requirement::new(demand, service_cost))
}

/// `A12` with prefix `A` → 12.
fn label_number(label: &str, prefix: &str) -> Option<u32> {
    label.strip_prefix(prefix)?.parse().ok()
}

/// Reads the table of reference values, one `instance value value` row per
/// line.
///
/// Malformed rows are skipped with a warning.
///
/// # Errors
///
/// I/O failures only.
pub fn read_references(path: impl AsRef<Path>) -> Result<HashMap<String, Reference>, ParseError> {
    let file = File::open(path)?;
    let mut references = HashMap::new();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let parsed = match fields.as_slice() {
            [name, first, second, ..] => first
                .parse()
                .ok()
                .zip(second.parse().ok())
                .map(|(a, b)| (name.to_string(), Reference(a, b))),
            _ => None,
        };
        match parsed {
            Some((name, reference)) => {
                references.insert(name, reference);
            }
            None => warn!(line = index + 1, content = line, "skipping malformed reference"),
        }
    }

    Ok(references)
}
