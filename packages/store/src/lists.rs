//! Site-scoped list filtering.
//!
//! Shared lists carry per-site annotations as item suffixes:
//! `"a (site1)"` appears only on site1, `"b (not:site1)"` appears
//! everywhere except site1, and an unsuffixed item appears everywhere. The
//! suffix is stripped from whatever survives the filter.

/// Filter a list's items for one site slug, stripping the annotations
pub fn filter_site_list(items: &[String], slug: &str) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| {
            let (base, annotation) = split_annotation(item);
            match annotation {
                None => Some(base.to_string()),
                Some(sites) => {
                    if site_matches(sites, slug) {
                        Some(base.to_string())
                    } else {
                        None
                    }
                }
            }
        })
        .collect()
}

/// `"a (site1)"` → `("a", Some("site1"))`; `"c"` → `("c", None)`
fn split_annotation(item: &str) -> (&str, Option<&str>) {
    let trimmed = item.trim_end();
    if !trimmed.ends_with(')') {
        return (trimmed, None);
    }
    match trimmed.rfind(" (") {
        Some(idx) => {
            let annotation = &trimmed[idx + 2..trimmed.len() - 1];
            (&trimmed[..idx], Some(annotation))
        }
        None => (trimmed, None),
    }
}

/// An annotation is a comma-separated set of slugs, each optionally
/// negated with `not:`. Annotated items are shown only on sites they name:
/// a `not:` entry excludes its site outright, and an annotation with no
/// entry naming the current site excludes the item too.
fn site_matches(annotation: &str, slug: &str) -> bool {
    let entries: Vec<&str> = annotation.split(',').map(str::trim).collect();

    if entries
        .iter()
        .any(|e| e.strip_prefix("not:") == Some(slug))
    {
        return false;
    }
    entries.iter().any(|e| !e.starts_with("not:") && *e == slug)
}
