//! Core Types
//!
//! Mirrors of `@angular/core` enums the compiler emits as numbers, and the
//! conversion of CSS selectors into the runtime's selector arrays.

use serde::{Deserialize, Serialize};

use crate::directive_matching::CssSelector;
use crate::output::output_ast::{literal, literal_arr, Expression};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ViewEncapsulation {
    #[default]
    Emulated = 0,
    Native = 1,
    None = 2,
    ShadowDom = 3,
}

impl ViewEncapsulation {
    pub fn from_number(value: f64) -> Option<Self> {
        match value as i64 {
            0 => Some(ViewEncapsulation::Emulated),
            1 => Some(ViewEncapsulation::Native),
            2 => Some(ViewEncapsulation::None),
            3 => Some(ViewEncapsulation::ShadowDom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChangeDetectionStrategy {
    OnPush = 0,
    Default = 1,
}

/// Flags marking the parts of a selector array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorFlags {
    NOT = 0b0001,
    ATTRIBUTE = 0b0010,
    ELEMENT = 0b0100,
    CLASS = 0b1000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderFlags {
    Create = 0b01,
    Update = 0b10,
}

/// Markers inside a static attribute array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeMarker {
    NamespaceURI = 0,
    Classes = 1,
    Styles = 2,
    /// Names after this marker take part in directive matching only.
    SelectOnly = 3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum R3SelectorPart {
    Text(String),
    Flags(u32),
}

pub type R3CssSelector = Vec<R3SelectorPart>;
pub type R3CssSelectorList = Vec<R3CssSelector>;

fn text_parts<'a, I: IntoIterator<Item = &'a String> + 'a>(values: I) -> impl Iterator<Item = R3SelectorPart> + 'a where I::IntoIter: 'a {
    values.into_iter().map(|v| R3SelectorPart::Text(v.clone()))
}

fn attr_parts(selector: &CssSelector) -> Vec<R3SelectorPart> {
    selector
        .attrs
        .iter()
        .flat_map(|(name, value)| [R3SelectorPart::Text(name.clone()), R3SelectorPart::Text(value.clone())])
        .collect()
}

fn class_parts(selector: &CssSelector) -> Vec<R3SelectorPart> {
    if selector.class_names.is_empty() {
        return Vec::new();
    }
    std::iter::once(R3SelectorPart::Flags(SelectorFlags::CLASS as u32))
        .chain(text_parts(&selector.class_names))
        .collect()
}

fn to_simple_selector(selector: &CssSelector) -> R3CssSelector {
    let element = match selector.element.as_deref() {
        Some(el) if el != "*" => el.to_string(),
        _ => String::new(),
    };
    let mut parts = vec![R3SelectorPart::Text(element)];
    parts.extend(attr_parts(selector));
    parts.extend(class_parts(selector));
    parts
}

fn to_negative_selector(selector: &CssSelector) -> R3CssSelector {
    let not = SelectorFlags::NOT as u32;
    if let Some(element) = &selector.element {
        let mut parts = vec![
            R3SelectorPart::Flags(not | SelectorFlags::ELEMENT as u32),
            R3SelectorPart::Text(element.clone()),
        ];
        parts.extend(attr_parts(selector));
        parts.extend(class_parts(selector));
        parts
    } else if !selector.attrs.is_empty() {
        let mut parts = vec![R3SelectorPart::Flags(not | SelectorFlags::ATTRIBUTE as u32)];
        parts.extend(attr_parts(selector));
        parts.extend(class_parts(selector));
        parts
    } else if !selector.class_names.is_empty() {
        std::iter::once(R3SelectorPart::Flags(not | SelectorFlags::CLASS as u32))
            .chain(text_parts(&selector.class_names))
            .collect()
    } else {
        Vec::new()
    }
}

fn to_r3_selector(selector: &CssSelector) -> R3CssSelector {
    let mut parts = to_simple_selector(selector);
    for not_selector in &selector.not_selectors {
        parts.extend(to_negative_selector(not_selector));
    }
    parts
}

/// Converts `selector` to the runtime's selector arrays. An empty or
/// unparsable selector yields no entries.
pub fn parse_selector_to_r3_selector(selector: Option<&str>) -> R3CssSelectorList {
    match selector {
        Some(selector) if !selector.is_empty() => CssSelector::parse(selector)
            .map(|selectors| selectors.iter().map(to_r3_selector).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

pub fn selector_list_to_expression(list: &R3CssSelectorList) -> Expression {
    literal_arr(
        list.iter()
            .map(|selector| {
                literal_arr(
                    selector
                        .iter()
                        .map(|part| match part {
                            R3SelectorPart::Text(text) => literal(text.as_str()),
                            R3SelectorPart::Flags(flags) => literal(*flags as f64),
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> R3SelectorPart {
        R3SelectorPart::Text(value.to_string())
    }

    #[test]
    fn should_convert_attribute_and_class_selectors() {
        let list = parse_selector_to_r3_selector(Some("button[mat-button].primary, [dir]"));
        assert_eq!(
            list,
            vec![
                vec![text("button"), text("mat-button"), text(""), R3SelectorPart::Flags(8), text("primary")],
                vec![text(""), text("dir"), text("")],
            ]
        );
    }

    #[test]
    fn should_convert_negative_selectors() {
        let list = parse_selector_to_r3_selector(Some("div:not(.hidden)"));
        assert_eq!(list, vec![vec![text("div"), R3SelectorPart::Flags(9), text("hidden")]]);
        assert!(parse_selector_to_r3_selector(Some("")).is_empty());
        assert!(parse_selector_to_r3_selector(None).is_empty());
    }

    #[test]
    fn should_map_encapsulation_numbers() {
        assert_eq!(ViewEncapsulation::from_number(2.0), Some(ViewEncapsulation::None));
        assert_eq!(ViewEncapsulation::from_number(7.0), None);
    }
}
