use tokensync_interchange::TokenEntry;

/// Compute the host variable name for an entry.
///
/// The leading collection segment and then the leading mode segment are
/// dropped when they match (case-insensitively); the rest is joined with
/// slashes. `colors.light.brand.primary` in collection `colors`, mode
/// `light` becomes `brand/primary`.
pub fn variable_name(entry: &TokenEntry) -> String {
    variable_name_from_path(&entry.path, &entry.collection, &entry.mode)
}

pub fn variable_name_from_path(path: &str, collection: &str, mode: &str) -> String {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let mut rest: &[&str] = &segments;

    if let Some((first, tail)) = rest.split_first() {
        if first.eq_ignore_ascii_case(collection) {
            rest = tail;
        }
    }
    if let Some((first, tail)) = rest.split_first() {
        if first.eq_ignore_ascii_case(mode) {
            rest = tail;
        }
    }

    // A path made only of qualifiers keeps its full form.
    if rest.is_empty() {
        return segments.join("/");
    }
    rest.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_collection_then_mode() {
        assert_eq!(
            variable_name_from_path("colors.light.brand.primary", "colors", "light"),
            "brand/primary"
        );
    }

    #[test]
    fn stripping_is_case_insensitive() {
        assert_eq!(
            variable_name_from_path("Colors.LIGHT.primary", "colors", "Light"),
            "primary"
        );
    }

    #[test]
    fn keeps_segments_that_do_not_match() {
        assert_eq!(
            variable_name_from_path("color.gray.50", "palette", "default"),
            "color/gray/50"
        );
        // a leading mode qualifier goes even without a collection qualifier
        assert_eq!(
            variable_name_from_path("spacing.sm", "tokens", "spacing"),
            "sm"
        );
        assert_eq!(
            variable_name_from_path("brand.light.primary", "colors", "light"),
            "brand/light/primary"
        );
    }

    #[test]
    fn qualifier_only_path_keeps_full_form() {
        assert_eq!(variable_name_from_path("colors.light", "colors", "light"), "colors/light");
    }
}
