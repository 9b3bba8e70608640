//! Human-readable questions for missing-data diagnostics.
//!
//! The locale only changes wording; it never influences evaluation.

use crate::types::{Catalog, MissingElement, Primitive, RequirementKind, TypeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    /// Parse a locale tag such as `en`, `fr` or `fr-CA`.
    ///
    /// Unsupported locales fall back to English.
    pub fn parse(tag: &str) -> Locale {
        let lang = tag
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match lang.as_str() {
            "en" | "" => Locale::En,
            "fr" => Locale::Fr,
            _ => {
                tracing::warn!(locale = %tag, "unsupported locale, falling back to English");
                Locale::En
            }
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }
}

/// The question asking for a missing element, in the given locale.
pub fn question(element: &MissingElement, catalog: &Catalog, locale: Locale) -> String {
    let target = catalog.display_name(&element.target_type);
    let owner = format!("{} ({})", element.target, target);

    if element.kind == RequirementKind::Includes {
        let kinds = variant_list(catalog, &element.member_type);
        let base = match locale {
            Locale::En => format!(
                "Please provide at least one {} for {}",
                element.member, owner
            ),
            Locale::Fr => format!(
                "Veuillez fournir au moins un élément {} pour {}",
                element.member, owner
            ),
        };
        return match kinds {
            Some(list) => format!("{} ({})", base, one_of(locale, &list)),
            None => base,
        };
    }

    let member_def = catalog.resolve(&element.member_type).ok();
    match member_def.map(|d| &d.kind) {
        Some(TypeKind::Record) => {
            let label = catalog.display_name(&element.member_type);
            let kinds = variant_list(catalog, &element.member_type).unwrap_or_default();
            match locale {
                Locale::En => format!(
                    "Which kind of {} is the {} of {}? ({})",
                    label,
                    element.member,
                    owner,
                    one_of(locale, &kinds)
                ),
                Locale::Fr => format!(
                    "Quel type de {} est le {} de {} ? ({})",
                    label,
                    element.member,
                    owner,
                    one_of(locale, &kinds)
                ),
            }
        }
        other => {
            let hint = match other {
                Some(TypeKind::Enumeration(values)) => Some(one_of(locale, &values.join(", "))),
                Some(TypeKind::Primitive(Primitive::Boolean)) => Some(match locale {
                    Locale::En => "yes/no".to_string(),
                    Locale::Fr => "oui/non".to_string(),
                }),
                _ => None,
            };
            let base = match locale {
                Locale::En => format!("What is the {} of {}?", element.member, owner),
                Locale::Fr => format!("Quel est le {} de {} ?", element.member, owner),
            };
            match hint {
                Some(h) => format!("{} ({})", base, h),
                None => base,
            }
        }
    }
}

fn one_of(locale: Locale, list: &str) -> String {
    match locale {
        Locale::En => format!("one of: {}", list),
        Locale::Fr => format!("parmi : {}", list),
    }
}

/// Concrete variant names that can fill a slot of the given type.
fn variant_list(catalog: &Catalog, type_name: &str) -> Option<String> {
    let def = catalog.resolve(type_name).ok()?;
    let mut names: Vec<&str> = Vec::new();
    if !def.is_abstract {
        names.push(def.display_name());
    }
    for v in &def.variants {
        let variant = catalog.get(*v);
        if !variant.is_abstract {
            names.push(variant.display_name());
        }
    }
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}
