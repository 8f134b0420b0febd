//! Custom Elements
//!
//! Definition registry mapping element names to widget kinds.

use std::collections::HashMap;

/// Custom element definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDefinition<K> {
    pub name: &'static str,
    pub kind: K,
    /// Attributes whose changes trigger `attribute_changed`
    pub observed_attributes: &'static [&'static str],
    /// Participates in form value collection
    pub form_associated: bool,
}

impl<K> ElementDefinition<K> {
    pub fn observes(&self, attribute: &str) -> bool {
        self.observed_attributes.contains(&attribute)
    }
}

/// Custom element errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomElementError {
    #[error("Invalid custom element name: {0}")]
    InvalidName(String),

    #[error("Custom element already defined: {0}")]
    AlreadyDefined(String),
}

/// Custom elements registry
#[derive(Debug)]
pub struct DefinitionRegistry<K> {
    definitions: HashMap<&'static str, ElementDefinition<K>>,
}

impl<K> Default for DefinitionRegistry<K> {
    fn default() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }
}

impl<K: Copy> DefinitionRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a custom element
    pub fn define(&mut self, definition: ElementDefinition<K>) -> Result<(), CustomElementError> {
        if !Self::is_valid_name(definition.name) {
            return Err(CustomElementError::InvalidName(definition.name.to_string()));
        }
        if self.definitions.contains_key(definition.name) {
            return Err(CustomElementError::AlreadyDefined(definition.name.to_string()));
        }
        tracing::trace!("Defined custom element {}", definition.name);
        self.definitions.insert(definition.name, definition);
        Ok(())
    }

    /// Get element definition
    pub fn get(&self, name: &str) -> Option<&ElementDefinition<K>> {
        self.definitions.get(name)
    }

    pub fn kind(&self, name: &str) -> Option<K> {
        self.get(name).map(|d| d.kind)
    }

    /// Check if element is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Validate custom element name
    pub fn is_valid_name(name: &str) -> bool {
        // Must contain hyphen
        if !name.contains('-') {
            return false;
        }

        // Must start with lowercase letter
        if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return false;
        }

        if name.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace()) {
            return false;
        }

        let reserved = [
            "annotation-xml",
            "color-profile",
            "font-face",
            "font-face-src",
            "font-face-uri",
            "font-face-format",
            "font-face-name",
            "missing-glyph",
        ];
        !reserved.contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(name: &'static str) -> ElementDefinition<u8> {
        ElementDefinition {
            name,
            kind: 1,
            observed_attributes: &["expanded"],
            form_associated: false,
        }
    }

    #[test]
    fn test_valid_names() {
        assert!(DefinitionRegistry::<u8>::is_valid_name("trellis-carousel"));
        assert!(!DefinitionRegistry::<u8>::is_valid_name("carousel")); // no hyphen
        assert!(!DefinitionRegistry::<u8>::is_valid_name("Trellis-Carousel"));
        assert!(!DefinitionRegistry::<u8>::is_valid_name("font-face"));
    }

    #[test]
    fn test_define() {
        let mut registry = DefinitionRegistry::new();
        assert!(registry.define(definition("trellis-accordion")).is_ok());
        assert!(registry.is_defined("trellis-accordion"));
        assert_eq!(registry.kind("trellis-accordion"), Some(1));
        assert!(registry.get("trellis-accordion").unwrap().observes("expanded"));

        assert_eq!(
            registry.define(definition("trellis-accordion")),
            Err(CustomElementError::AlreadyDefined("trellis-accordion".into()))
        );
        assert!(matches!(
            registry.define(definition("accordion")),
            Err(CustomElementError::InvalidName(_))
        ));
    }
}
