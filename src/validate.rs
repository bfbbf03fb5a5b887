//! Advisory checks over a window. Nothing here blocks an edit or generation.

use crate::widget::Window;
use std::collections::HashSet;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Warning {
    /// Two elements share a persistence flag
    DuplicateFlag { flag: String, element: String },
    /// An element has no visible label
    EmptyText { folder: String },
    /// `(` and `)` counts differ in the callback logic
    UnbalancedParens { element: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DuplicateFlag { flag, element } => {
                write!(f, "duplicate flag \"{flag}\" in element \"{element}\"")
            }
            Warning::EmptyText { folder } => {
                write!(f, "element inside \"{folder}\" has no display text")
            }
            Warning::UnbalancedParens { element } => {
                write!(f, "mismatched parentheses in \"{element}\" logic")
            }
        }
    }
}

/// Walks the window in generation order and collects every warning.
pub(crate) fn validate(window: &Window) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let mut flags = HashSet::new();

    for folder in &window.folders {
        for element in &folder.elements {
            if let Some(flag) = element.flag().filter(|f| !f.is_empty())
                && !flags.insert(flag)
            {
                warnings.push(Warning::DuplicateFlag {
                    flag: flag.to_owned(),
                    element: element.text.clone(),
                });
            }
            if element.text.trim().is_empty() {
                warnings.push(Warning::EmptyText {
                    folder: folder.text.clone(),
                });
            }
            if let Some(logic) = element.custom_logic.as_deref() {
                let open = logic.matches('(').count();
                let close = logic.matches(')').count();
                if open != close {
                    warnings.push(Warning::UnbalancedParens {
                        element: element.text.clone(),
                    });
                }
            }
        }
    }

    for warning in &warnings {
        log::debug!("validation: {warning}");
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{Element, ElementKind, Folder};

    fn toggle(text: &str, flag: &str, logic: Option<&str>) -> Element {
        Element {
            id: crate::widget::new_id(),
            text: text.into(),
            custom_logic: logic.map(Into::into),
            kind: ElementKind::Toggle {
                flag: flag.into(),
                default_state: false,
            },
        }
    }

    fn window(elements: Vec<Element>) -> Window {
        Window {
            title: "T".into(),
            folders: vec![Folder {
                id: "f".into(),
                text: "Main".into(),
                elements,
            }],
        }
    }

    #[test]
    fn test_clean_window() {
        let w = window(vec![
            toggle("A", "a", Some("print((1))")),
            toggle("B", "b", None),
        ]);
        assert!(validate(&w).is_empty());
    }

    #[test]
    fn test_duplicate_flags_across_folders() {
        let mut w = window(vec![toggle("A", "same", None)]);
        w.folders.push(Folder {
            id: "g".into(),
            text: "Other".into(),
            elements: vec![toggle("B", "same", None)],
        });
        assert_eq!(
            validate(&w),
            vec![Warning::DuplicateFlag {
                flag: "same".into(),
                element: "B".into()
            }]
        );
    }

    #[test]
    fn test_empty_flags_are_not_duplicates() {
        let w = window(vec![toggle("A", "", None), toggle("B", "", None)]);
        assert!(validate(&w).is_empty());
    }

    #[test]
    fn test_empty_text_and_parens() {
        let w = window(vec![toggle("  ", "a", None), toggle("C", "c", Some("print(("))]);
        let warnings = validate(&w);
        assert_eq!(
            warnings,
            vec![
                Warning::EmptyText {
                    folder: "Main".into()
                },
                Warning::UnbalancedParens {
                    element: "C".into()
                },
            ]
        );
        assert_eq!(
            warnings[1].to_string(),
            "mismatched parentheses in \"C\" logic"
        );
    }
}
