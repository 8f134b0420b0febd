//! Selectors
//!
//! The subset of CSS selectors widgets need to find their relatives:
//! type, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`, descendant and
//! child combinators, and comma-separated groups.

use crate::{DomError, DomTree, NodeId};

/// Parsed selector group (`a, b > c`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

/// `compound (combinator compound)*`, stored left to right
#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    value: Option<String>,
}

impl SelectorList {
    /// Parse a selector group
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let mut parser = Parser {
            chars: input.chars().collect(),
            pos: 0,
            input,
        };
        let mut selectors = vec![parser.complex()?];
        while parser.eat(',') {
            selectors.push(parser.complex()?);
        }
        if !parser.at_end() {
            return Err(parser.error());
        }
        Ok(Self { selectors })
    }

    /// Whether the element matches any selector of the group
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        tree.is_element(id) && self.selectors.iter().any(|s| s.matches(tree, id))
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.matches_at(tree, self.compounds.len() - 1, id)
    }

    fn matches_at(&self, tree: &DomTree, index: usize, id: NodeId) -> bool {
        if !self.compounds[index].matches(tree, id) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent(id)
                .is_some_and(|p| tree.is_element(p) && self.matches_at(tree, index - 1, p)),
            Combinator::Descendant => tree
                .ancestors(id)
                .filter(|&a| tree.is_element(a))
                .any(|a| self.matches_at(tree, index - 1, a)),
        }
    }
}

impl Compound {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(element) = tree.get(id).and_then(|n| n.as_element()) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(wanted) = &self.id {
            if element.id() != Some(wanted.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.classes().any(|have| have == c)) {
            return false;
        }
        self.attrs.iter().all(|a| match (&a.value, element.get_attr(&a.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        })
    }
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    input: &'a str,
}

impl Parser<'_> {
    fn error(&self) -> DomError {
        DomError::InvalidSelector(self.input.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> Result<String, DomError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn complex(&mut self) -> Result<ComplexSelector, DomError> {
        self.skip_whitespace();
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(_) => return Err(self.error()),
            }
            compounds.push(self.compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, DomError> {
        let mut compound = Compound::default();
        let mut any = false;
        if self.eat('*') {
            any = true;
        } else if self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
            any = true;
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attribute()?);
                }
                _ => break,
            }
            any = true;
        }
        if any { Ok(compound) } else { Err(self.error()) }
    }

    fn attribute(&mut self) -> Result<AttrSelector, DomError> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();
        let value = if self.eat('=') {
            self.skip_whitespace();
            Some(self.attribute_value()?)
        } else {
            None
        };
        self.skip_whitespace();
        if !self.eat(']') {
            return Err(self.error());
        }
        Ok(AttrSelector { name, value })
    }

    fn attribute_value(&mut self) -> Result<String, DomError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.at_end() {
                    return Err(self.error());
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(value)
            }
            _ => self.ident(),
        }
    }
}

impl DomTree {
    /// First descendant of `scope` matching `selector`
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.descendants(scope).into_iter().find(|&n| list.matches(self, n)))
    }

    /// All descendants of `scope` matching `selector`, in tree order
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|&n| list.matches(self, n))
            .collect())
    }

    /// Nearest inclusive ancestor matching `selector`
    pub fn closest(&self, id: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let list = SelectorList::parse(selector)?;
        Ok(std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| list.matches(self, n)))
    }

    pub fn matches(&self, id: NodeId, selector: &str) -> Result<bool, DomError> {
        Ok(SelectorList::parse(selector)?.matches(self, id))
    }
}
