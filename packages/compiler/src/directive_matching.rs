//! Directive Matching
//!
//! CSS selector parsing and matching of directive selectors against
//! template elements.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static SELECTOR_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\:not\()|(([\.\#]?)[-\w]+)|(?:\[([-.\w*\\$]+)(?:=(?:"([^"]*)"|'([^']*)'|([^\]]*)))?\])|(\))|(\s*,\s*)"#)
        .unwrap()
});

const NOT: usize = 1;
const TAG: usize = 2;
const PREFIX: usize = 3;
const ATTRIBUTE: usize = 4;
const ATTRIBUTE_VALUE_DOUBLE: usize = 5;
const ATTRIBUTE_VALUE_SINGLE: usize = 6;
const ATTRIBUTE_VALUE_UNQUOTED: usize = 7;
const NOT_END: usize = 8;
const SEPARATOR: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CssSelector {
    pub element: Option<String>,
    pub class_names: Vec<String>,
    /// Attribute `(name, value)` pairs; an empty value matches any value.
    pub attrs: Vec<(String, String)>,
    pub not_selectors: Vec<CssSelector>,
}

impl CssSelector {
    pub fn new() -> Self {
        CssSelector::default()
    }

    /// Parses a comma separated selector list such as `button[mat-button], .btn:not(.flat)`.
    pub fn parse(selector: &str) -> Result<Vec<CssSelector>, String> {
        let mut results = Vec::new();
        let mut current = CssSelector::new();
        let mut in_not = false;

        for cap in SELECTOR_REGEXP.captures_iter(selector) {
            if cap.get(NOT).is_some() {
                if in_not {
                    return Err("Nesting :not in a selector is not allowed".to_string());
                }
                in_not = true;
                current.not_selectors.push(CssSelector::new());
            }

            let target = parse_target(&mut current, in_not);

            if let Some(tag) = cap.get(TAG) {
                let tag = tag.as_str();
                match cap.get(PREFIX).map(|m| m.as_str()).unwrap_or("") {
                    "#" => target.add_attribute("id", &tag[1..]),
                    "." => target.add_class_name(&tag[1..]),
                    _ => target.set_element(tag),
                }
            }

            if let Some(attr) = cap.get(ATTRIBUTE) {
                let value = [ATTRIBUTE_VALUE_DOUBLE, ATTRIBUTE_VALUE_SINGLE, ATTRIBUTE_VALUE_UNQUOTED]
                    .iter()
                    .find_map(|group| cap.get(*group))
                    .map(|m| m.as_str())
                    .unwrap_or("");
                target.add_attribute(&unescape_attribute(attr.as_str())?, value);
            }

            if cap.get(NOT_END).is_some() {
                in_not = false;
            }

            if cap.get(SEPARATOR).is_some() {
                if in_not {
                    return Err("Multiple selectors in :not are not supported".to_string());
                }
                push_result(&mut results, std::mem::take(&mut current));
            }
        }

        push_result(&mut results, current);
        Ok(results)
    }

    pub fn set_element(&mut self, element: &str) {
        self.element = Some(element.to_string());
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) {
        self.attrs.push((name.to_string(), value.to_lowercase()));
    }

    pub fn add_class_name(&mut self, name: &str) {
        self.class_names.push(name.to_lowercase());
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the element described by `element` satisfies this selector.
    pub fn matches(&self, element: &CssSelector) -> bool {
        self.matches_positive(element)
            && !self.not_selectors.iter().any(|not| not.matches_positive(element))
    }

    fn matches_positive(&self, element: &CssSelector) -> bool {
        if let Some(name) = &self.element {
            if name != "*" && element.element.as_deref() != Some(name.as_str()) {
                return false;
            }
        }
        if !self.class_names.iter().all(|c| element.class_names.contains(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| {
            element
                .attrs
                .iter()
                .any(|(el_name, el_value)| el_name == name && (value.is_empty() || el_value.eq_ignore_ascii_case(value)))
        })
    }
}

fn parse_target(current: &mut CssSelector, in_not: bool) -> &mut CssSelector {
    if in_not && !current.not_selectors.is_empty() {
        let last = current.not_selectors.len() - 1;
        &mut current.not_selectors[last]
    } else {
        current
    }
}

fn push_result(results: &mut Vec<CssSelector>, mut selector: CssSelector) {
    if !selector.not_selectors.is_empty()
        && selector.element.is_none()
        && selector.class_names.is_empty()
        && selector.attrs.is_empty()
    {
        selector.element = Some("*".to_string());
    }
    results.push(selector);
}

fn unescape_attribute(attr: &str) -> Result<String, String> {
    let mut result = String::new();
    let mut escaping = false;
    for ch in attr.chars() {
        if ch == '\\' {
            escaping = true;
            continue;
        }
        if ch == '$' && !escaping {
            return Err(format!(
                "Error in attribute selector \"{}\". Unescaped \"$\" is not supported. Please escape with \"\\$\".",
                attr
            ));
        }
        escaping = false;
        result.push(ch);
    }
    Ok(result)
}

impl fmt::Display for CssSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element.as_deref().unwrap_or(""))?;
        for class_name in &self.class_names {
            write!(f, ".{}", class_name)?;
        }
        for (name, value) in &self.attrs {
            let name = name.replace('$', "\\$");
            if value.is_empty() {
                write!(f, "[{}]", name)?;
            } else {
                write!(f, "[{}={}]", name, value)?;
            }
        }
        for not in &self.not_selectors {
            write!(f, ":not({})", not)?;
        }
        Ok(())
    }
}

/// Describes a template element as a selector so it can be matched.
///
/// A `class` attribute contributes its whitespace separated class names.
pub fn create_css_selector(element_name: &str, attributes: &[(String, String)]) -> CssSelector {
    let mut selector = CssSelector::new();
    selector.set_element(element_name);
    for (name, value) in attributes {
        selector.attrs.push((name.clone(), value.clone()));
        if name.eq_ignore_ascii_case("class") {
            for class_name in value.split_whitespace() {
                selector.add_class_name(class_name);
            }
        }
    }
    selector
}

/// Matches elements against registered selectors, yielding the data of each
/// selectable at most once, in registration order.
pub struct SelectorMatcher<T> {
    selectables: Vec<(Vec<CssSelector>, T)>,
}

impl<T> SelectorMatcher<T> {
    pub fn new() -> Self {
        SelectorMatcher {
            selectables: Vec::new(),
        }
    }

    /// Registers `data` under every selector of a parsed selector list.
    pub fn add_selectables(&mut self, selectors: Vec<CssSelector>, data: T) {
        self.selectables.push((selectors, data));
    }

    pub fn is_empty(&self) -> bool {
        self.selectables.is_empty()
    }

    pub fn match_(&self, element: &CssSelector) -> Vec<&T> {
        self.selectables
            .iter()
            .filter(|(selectors, _)| selectors.iter().any(|s| s.matches(element)))
            .map(|(_, data)| data)
            .collect()
    }
}

impl<T> Default for SelectorMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}
