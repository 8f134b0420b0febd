//! ARIA Support
//!
//! The roles and live-region levels Trellis widgets write.

use std::fmt;
use std::str::FromStr;

use crate::A11yError;

/// ARIA role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    // Landmark roles
    Region,

    // Widget roles
    AlertDialog,
    Button,
    Checkbox,
    Combobox,
    Dialog,
    Listbox,
    Menu,
    MenuBar,
    MenuItem,
    Option,
    Radio,
    RadioGroup,
    Slider,
    Tab,
    TabList,
    TabPanel,
    TextBox,
    ToolTip,

    // Document structure
    Group,
    Heading,
    Img,
    Presentation,
}

impl AriaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::AlertDialog => "alertdialog",
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Combobox => "combobox",
            Self::Dialog => "dialog",
            Self::Listbox => "listbox",
            Self::Menu => "menu",
            Self::MenuBar => "menubar",
            Self::MenuItem => "menuitem",
            Self::Option => "option",
            Self::Radio => "radio",
            Self::RadioGroup => "radiogroup",
            Self::Slider => "slider",
            Self::Tab => "tab",
            Self::TabList => "tablist",
            Self::TabPanel => "tabpanel",
            Self::TextBox => "textbox",
            Self::ToolTip => "tooltip",
            Self::Group => "group",
            Self::Heading => "heading",
            Self::Img => "img",
            Self::Presentation => "presentation",
        }
    }

    /// Parse role from string
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_lowercase().as_str() {
            "region" => Self::Region,
            "alertdialog" => Self::AlertDialog,
            "button" => Self::Button,
            "checkbox" => Self::Checkbox,
            "combobox" => Self::Combobox,
            "dialog" => Self::Dialog,
            "listbox" => Self::Listbox,
            "menu" => Self::Menu,
            "menubar" => Self::MenuBar,
            "menuitem" => Self::MenuItem,
            "option" => Self::Option,
            "radio" => Self::Radio,
            "radiogroup" => Self::RadioGroup,
            "slider" => Self::Slider,
            "tab" => Self::Tab,
            "tablist" => Self::TabList,
            "tabpanel" => Self::TabPanel,
            "textbox" => Self::TextBox,
            "tooltip" => Self::ToolTip,
            "group" => Self::Group,
            "heading" => Self::Heading,
            "img" => Self::Img,
            "presentation" | "none" => Self::Presentation,
            _ => return None,
        })
    }

    /// Whether the role is operable by the user
    pub fn is_widget(&self) -> bool {
        !matches!(
            self,
            Self::Region | Self::Group | Self::Heading | Self::Img | Self::Presentation
        )
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AriaRole {
    type Err = A11yError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| A11yError::InvalidRole(s.to_string()))
    }
}

/// Live region politeness (`aria-live`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Politeness {
    Off,
    #[default]
    Polite,
    Assertive,
}

impl Politeness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

impl FromStr for Politeness {
    type Err = A11yError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "polite" => Ok(Self::Polite),
            "assertive" => Ok(Self::Assertive),
            _ => Err(A11yError::InvalidPoliteness(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(AriaRole::parse("TabPanel"), Some(AriaRole::TabPanel));
        assert_eq!(AriaRole::parse("none"), Some(AriaRole::Presentation));
        assert_eq!(AriaRole::parse("bogus"), None);
        assert!("bogus".parse::<AriaRole>().is_err());
    }

    #[test]
    fn test_role_round_trip_names() {
        for role in [AriaRole::Slider, AriaRole::MenuBar, AriaRole::AlertDialog] {
            assert_eq!(AriaRole::parse(role.as_str()), Some(role));
        }
        assert!(AriaRole::Tab.is_widget());
        assert!(!AriaRole::Region.is_widget());
    }

    #[test]
    fn test_politeness() {
        assert_eq!(Politeness::default(), Politeness::Polite);
        assert_eq!("off".parse::<Politeness>(), Ok(Politeness::Off));
        assert!("loud".parse::<Politeness>().is_err());
    }
}
