use crate::core::io::error::{StructureError, StructureErrorKind};
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::BondOrder;
use std::collections::BTreeMap;

type Step<T = ()> = Result<T, StructureErrorKind>;

/// Limits applied while validating a parsed structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Largest number of disconnected fragments accepted (salts, solvates).
    pub max_fragments: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_fragments: 1 }
    }
}

/// Parses SMILES text into a validated molecular graph.
///
/// Explicit hydrogen atoms are folded into their neighbour's hydrogen count, aromatic
/// bonds outside rings are demoted to single bonds, and the result is checked for
/// ring membership of aromatic atoms, valence and fragment count.
pub fn parse_graph(text: &str, options: &ParseOptions) -> Result<MolecularGraph, StructureError> {
    let trimmed = text.trim();
    let mut reader = Reader::new(trimmed);
    reader
        .read()
        .map_err(|kind| StructureError::new(text, kind))?;
    let mut graph = reader.graph;
    finalize(&mut graph, options).map_err(|kind| StructureError::new(text, kind))?;
    Ok(graph)
}

struct RingOpening {
    atom: AtomId,
    bond: Option<BondOrder>,
}

struct Reader<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    graph: MolecularGraph,
    previous: Option<AtomId>,
    branches: Vec<AtomId>,
    pending_bond: Option<(BondOrder, usize)>,
    open_rings: BTreeMap<u16, RingOpening>,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            graph: MolecularGraph::new(),
            previous: None,
            branches: Vec::new(),
            pending_bond: None,
            open_rings: BTreeMap::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.bytes.get(self.pos).map(|&b| b as char)
    }

    fn unexpected(&self, position: usize) -> StructureErrorKind {
        let ch = self.text[position..].chars().next().unwrap_or('\0');
        StructureErrorKind::UnexpectedCharacter { ch, position }
    }

    fn read(&mut self) -> Step {
        if self.text.is_empty() {
            return Err(StructureErrorKind::Empty);
        }
        if let Some((position, _)) = self.text.char_indices().find(|(_, c)| !c.is_ascii()) {
            return Err(self.unexpected(position));
        }

        while let Some(ch) = self.peek() {
            let position = self.pos;
            match ch {
                '(' => {
                    let Some(previous) = self.previous else {
                        return Err(StructureErrorKind::UnbalancedBranch { position });
                    };
                    if self.pending_bond.is_some() {
                        return Err(StructureErrorKind::DanglingBond { position });
                    }
                    self.branches.push(previous);
                    self.pos += 1;
                }
                ')' => {
                    if let Some((_, at)) = self.pending_bond {
                        return Err(StructureErrorKind::DanglingBond { position: at });
                    }
                    let Some(anchor) = self.branches.pop() else {
                        return Err(StructureErrorKind::UnbalancedBranch { position });
                    };
                    self.previous = Some(anchor);
                    self.pos += 1;
                }
                '-' | '=' | '#' | ':' | '/' | '\\' => {
                    if self.pending_bond.is_some() || self.previous.is_none() {
                        return Err(StructureErrorKind::DanglingBond { position });
                    }
                    let order = match ch {
                        '=' => BondOrder::Double,
                        '#' => BondOrder::Triple,
                        ':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.pending_bond = Some((order, position));
                    self.pos += 1;
                }
                '.' => {
                    if let Some((_, at)) = self.pending_bond {
                        return Err(StructureErrorKind::DanglingBond { position: at });
                    }
                    if self.previous.is_none() || !self.branches.is_empty() {
                        return Err(self.unexpected(position));
                    }
                    self.previous = None;
                    self.pos += 1;
                }
                '0'..='9' => {
                    self.pos += 1;
                    let label = u16::from(ch as u8 - b'0');
                    self.ring_closure(label, position)?;
                }
                '%' => {
                    self.pos += 1;
                    let digits = self.bytes.get(self.pos..self.pos + 2);
                    let label = match digits {
                        Some([a, b]) if a.is_ascii_digit() && b.is_ascii_digit() => {
                            u16::from(a - b'0') * 10 + u16::from(b - b'0')
                        }
                        _ => return Err(self.unexpected(position)),
                    };
                    self.pos += 2;
                    self.ring_closure(label, position)?;
                }
                '[' => {
                    let atom = self.bracket_atom()?;
                    self.attach(atom);
                }
                _ => {
                    let atom = self.organic_atom()?;
                    self.attach(atom);
                }
            }
        }

        if let Some((_, at)) = self.pending_bond {
            return Err(StructureErrorKind::DanglingBond { position: at });
        }
        if !self.branches.is_empty() {
            return Err(StructureErrorKind::UnbalancedBranch {
                position: self.text.len(),
            });
        }
        if let Some(&label) = self.open_rings.keys().next() {
            return Err(StructureErrorKind::UnclosedRing { label });
        }
        if self.graph.is_empty() {
            return Err(StructureErrorKind::Empty);
        }
        Ok(())
    }

    fn implied_bond(&self, a: AtomId, b: AtomId) -> BondOrder {
        let aromatic = |id| self.graph.atom(id).is_some_and(|atom| atom.aromatic);
        if aromatic(a) && aromatic(b) {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn attach(&mut self, atom: Atom) {
        let id = self.graph.add_atom(atom);
        if let Some(previous) = self.previous {
            let order = match self.pending_bond.take() {
                Some((order, _)) => order,
                None => self.implied_bond(previous, id),
            };
            self.graph.add_bond(previous, id, order);
        }
        self.previous = Some(id);
    }

    fn ring_closure(&mut self, label: u16, position: usize) -> Step {
        let Some(current) = self.previous else {
            return Err(self.unexpected(position));
        };
        let explicit = self.pending_bond.take().map(|(order, _)| order);
        match self.open_rings.remove(&label) {
            None => {
                self.open_rings.insert(
                    label,
                    RingOpening {
                        atom: current,
                        bond: explicit,
                    },
                );
            }
            Some(opening) => {
                let order = match (opening.bond, explicit) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(StructureErrorKind::ConflictingRingBond { label });
                    }
                    (Some(order), _) | (None, Some(order)) => order,
                    (None, None) => self.implied_bond(opening.atom, current),
                };
                if !self.graph.add_bond(opening.atom, current, order) {
                    return Err(StructureErrorKind::InvalidRingClosure { label });
                }
            }
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> Step<Atom> {
        let position = self.pos;
        let rest = &self.text[position..];
        for (symbol, element) in [("Cl", Element::Cl), ("Br", Element::Br)] {
            if rest.starts_with(symbol) {
                self.pos += 2;
                return Ok(Atom::organic(element));
            }
        }

        let Some(ch) = self.peek() else {
            return Err(StructureErrorKind::Empty);
        };
        let symbol = &rest[..1];
        if let Some(element) = Element::from_symbol(symbol).filter(|e| e.is_organic_subset()) {
            self.pos += 1;
            return Ok(Atom::organic(element));
        }
        if let Some(element) = Element::from_aromatic_symbol(symbol) {
            self.pos += 1;
            return Ok(Atom::aromatic(element));
        }
        if ch.is_ascii_alphabetic() {
            let length = if rest.len() > 1 && rest.as_bytes()[1].is_ascii_lowercase() {
                2
            } else {
                1
            };
            return Err(StructureErrorKind::UnknownElement {
                symbol: rest[..length].to_string(),
                position,
            });
        }
        Err(self.unexpected(position))
    }

    fn read_number(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        self.text[start..self.pos].parse().ok()
    }

    fn bracket_symbol(&mut self) -> Step<(Element, bool)> {
        let position = self.pos;
        let rest = &self.text[position..];
        let bytes = rest.as_bytes();
        let Some(&first) = bytes.first() else {
            return Err(StructureErrorKind::UnterminatedBracket { position });
        };

        if first.is_ascii_lowercase() {
            if rest.starts_with("se") {
                self.pos += 2;
                return Ok((Element::Se, true));
            }
            if let Some(element) = Element::from_aromatic_symbol(&rest[..1]) {
                self.pos += 1;
                return Ok((element, true));
            }
            return Err(StructureErrorKind::UnknownElement {
                symbol: rest[..1].to_string(),
                position,
            });
        }

        if !first.is_ascii_uppercase() {
            return Err(self.unexpected(position));
        }
        if bytes.len() > 1 && bytes[1].is_ascii_lowercase() {
            if let Some(element) = Element::from_symbol(&rest[..2]) {
                self.pos += 2;
                return Ok((element, false));
            }
        }
        if let Some(element) = Element::from_symbol(&rest[..1]) {
            self.pos += 1;
            return Ok((element, false));
        }
        let length = if bytes.len() > 1 && bytes[1].is_ascii_lowercase() {
            2
        } else {
            1
        };
        Err(StructureErrorKind::UnknownElement {
            symbol: rest[..length].to_string(),
            position,
        })
    }

    fn bracket_atom(&mut self) -> Step<Atom> {
        let open = self.pos;
        self.pos += 1;

        let isotope = self
            .read_number()
            .map(|n| u16::try_from(n).unwrap_or(u16::MAX));
        let (element, aromatic) = self.bracket_symbol()?;

        while self.peek() == Some('@') {
            self.pos += 1;
        }

        let mut hydrogens = 0u8;
        if self.peek() == Some('H') {
            self.pos += 1;
            hydrogens = self
                .read_number()
                .map(|n| u8::try_from(n).unwrap_or(u8::MAX))
                .unwrap_or(1);
        }

        let mut charge = 0i8;
        if let Some(sign @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let unit: i8 = if sign == '+' { 1 } else { -1 };
            let magnitude = match self.read_number() {
                Some(n) => i8::try_from(n.min(15)).unwrap_or(15),
                None => {
                    let mut count = 1i8;
                    while self.peek() == Some(sign) && count < 15 {
                        count += 1;
                        self.pos += 1;
                    }
                    count
                }
            };
            charge = unit * magnitude;
        }

        if self.peek() == Some(':') {
            let position = self.pos;
            self.pos += 1;
            if self.read_number().is_none() {
                return Err(self.unexpected(position));
            }
        }

        match self.peek() {
            Some(']') => self.pos += 1,
            Some(_) => return Err(self.unexpected(self.pos)),
            None => return Err(StructureErrorKind::UnterminatedBracket { position: open }),
        }

        Ok(Atom::bracket(element, hydrogens, charge)
            .with_aromatic(aromatic)
            .with_isotope(isotope))
    }
}

fn finalize(graph: &mut MolecularGraph, options: &ParseOptions) -> Step {
    fold_hydrogens(graph)?;
    if graph.is_empty() {
        return Err(StructureErrorKind::HydrogenOnly);
    }
    demote_acyclic_aromatic_bonds(graph);
    check_aromatic_ring_membership(graph)?;
    graph.refresh_implicit_hydrogens();
    check_valences(graph)?;

    let found = graph.fragments().len();
    if found > options.max_fragments {
        return Err(StructureErrorKind::TooManyFragments {
            found,
            allowed: options.max_fragments,
        });
    }
    Ok(())
}

fn fold_hydrogens(graph: &mut MolecularGraph) -> Step {
    let hydrogen_ids: Vec<(usize, AtomId)> = graph
        .atoms_iter()
        .enumerate()
        .filter(|(_, (_, atom))| atom.element == Element::H)
        .map(|(index, (id, _))| (index, id))
        .collect();

    for (index, id) in hydrogen_ids {
        let neighbors = graph.neighbors(id).to_vec();
        let Some(hydrogen) = graph.atom(id) else {
            continue;
        };
        let impossible = |valence: usize| StructureErrorKind::ImpossibleValence {
            atom: index,
            symbol: "H".to_string(),
            valence: u8::try_from(valence).unwrap_or(u8::MAX),
            max: 1,
        };

        match neighbors.as_slice() {
            [] => return Err(StructureErrorKind::HydrogenOnly),
            [neighbor] => {
                let is_hydrogen = graph
                    .atom(*neighbor)
                    .is_some_and(|atom| atom.element == Element::H);
                if is_hydrogen {
                    return Err(StructureErrorKind::HydrogenOnly);
                }
                let order = graph
                    .bond_between(id, *neighbor)
                    .map(|bond| bond.order)
                    .unwrap_or_default();
                let used = usize::from(order.valence_contribution())
                    + usize::from(hydrogen.hydrogens);
                if order != BondOrder::Single || hydrogen.charge != 0 || used > 1 {
                    return Err(impossible(used));
                }
                let neighbor = *neighbor;
                graph.remove_atom(id);
                if let Some(atom) = graph.atom_mut(neighbor) {
                    if atom.bracket {
                        atom.hydrogens = atom.hydrogens.saturating_add(1);
                    }
                }
            }
            _ => return Err(impossible(neighbors.len())),
        }
    }
    Ok(())
}

fn demote_acyclic_aromatic_bonds(graph: &mut MolecularGraph) {
    let ring_flags = graph.ring_bonds();
    let acyclic: Vec<usize> = graph
        .bonds()
        .iter()
        .zip(ring_flags)
        .enumerate()
        .filter(|(_, (bond, in_ring))| bond.order == BondOrder::Aromatic && !in_ring)
        .map(|(index, _)| index)
        .collect();
    for index in acyclic {
        graph.set_bond_order(index, BondOrder::Single);
    }
}

fn check_aromatic_ring_membership(graph: &MolecularGraph) -> Step {
    let ring_atoms = graph.ring_atoms();
    for (index, (id, atom)) in graph.atoms_iter().enumerate() {
        if atom.aromatic && !ring_atoms.contains(&id) {
            return Err(StructureErrorKind::AromaticOutsideRing {
                atom: index,
                symbol: atom.smiles_symbol(),
            });
        }
    }
    Ok(())
}

fn check_valences(graph: &MolecularGraph) -> Step {
    for (index, (id, atom)) in graph.atoms_iter().enumerate() {
        // An exocyclic multiple bond (pyridone-style c=O) already supplies the pi unit.
        let has_multiple_bond = graph
            .incident_bonds(id)
            .any(|bond| matches!(bond.order, BondOrder::Double | BondOrder::Triple));
        let pi = u8::from(
            atom.aromatic && atom.element.requires_pi_valence() && !has_multiple_bond,
        );
        let valence = graph
            .bond_order_sum(id)
            .saturating_add(atom.hydrogens)
            .saturating_add(pi);
        let max = atom.element.max_valence(atom.charge);
        if valence > max {
            return Err(StructureErrorKind::ImpossibleValence {
                atom: index,
                symbol: atom.smiles_symbol(),
                valence,
                max,
            });
        }
    }
    Ok(())
}
