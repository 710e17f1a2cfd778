use angular_compiler::core::{parse_selector_to_r3_selector, R3SelectorPart};
use angular_compiler::directive_matching::{create_css_selector, CssSelector, SelectorMatcher};

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str, attrs: &[(&str, &str)]) -> CssSelector {
        let attrs: Vec<(String, String)> = attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        create_css_selector(name, &attrs)
    }

    fn matcher(selectors: &[(&str, i32)]) -> SelectorMatcher<i32> {
        let mut matcher = SelectorMatcher::new();
        for (selector, id) in selectors {
            matcher.add_selectables(CssSelector::parse(selector).unwrap(), *id);
        }
        matcher
    }

    #[test]
    fn should_match_by_element_and_attribute() {
        let matcher = matcher(&[("button[mat-button]", 1), ("[ngModel]", 2), ("input", 3)]);
        let matched: Vec<i32> = matcher
            .match_(&element("button", &[("mat-button", "")]))
            .into_iter()
            .copied()
            .collect();
        assert_eq!(matched, vec![1]);

        let matched: Vec<i32> = matcher
            .match_(&element("input", &[("ngModel", "")]))
            .into_iter()
            .copied()
            .collect();
        assert_eq!(matched.len(), 2);
        assert!(matched.contains(&2) && matched.contains(&3));
    }

    #[test]
    fn should_match_classes_from_the_class_attribute() {
        let matcher = matcher(&[(".active", 1)]);
        assert_eq!(matcher.match_(&element("li", &[("class", "item active")])).len(), 1);
        assert!(matcher.match_(&element("li", &[("class", "item")])).is_empty());
    }

    #[test]
    fn should_honor_not_selectors() {
        let matcher = matcher(&[("div:not(.hidden)", 1)]);
        assert_eq!(matcher.match_(&element("div", &[])).len(), 1);
        assert!(matcher.match_(&element("div", &[("class", "hidden")])).is_empty());
    }

    #[test]
    fn should_match_any_selector_of_a_list() {
        let matcher = matcher(&[("[ngFor][ngForOf], ng-template[ngForOf]", 7)]);
        assert_eq!(matcher.match_(&element("ng-template", &[("ngForOf", "")])).len(), 1);
        assert_eq!(matcher.match_(&element("li", &[("ngFor", ""), ("ngForOf", "")])).len(), 1);
        assert!(matcher.match_(&element("li", &[("ngForOf", "")])).is_empty());
    }

    #[test]
    fn should_convert_selectors_for_the_runtime() {
        let list = parse_selector_to_r3_selector(Some("app-root"));
        assert_eq!(list, vec![vec![R3SelectorPart::Text("app-root".into())]]);
    }
}
