//! Protected-path matching.

/// Configured set of navigation targets requiring re-authentication.
///
/// Prefix entries match by "starts with"; submenu entries (sourced
/// dynamically, e.g. per-service pages) match literally. Exclusions take
/// precedence over both.
#[derive(Debug, Clone, Default)]
pub struct ProtectedPaths {
    prefixes: Vec<String>,
    literals: Vec<String>,
    exclusions: Vec<String>,
}

impl ProtectedPaths {
    pub fn new(
        prefixes: impl IntoIterator<Item = impl Into<String>>,
        exclusions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            literals: Vec::new(),
            exclusions: exclusions.into_iter().map(Into::into).collect(),
        }
    }

    /// Sections of the dashboard protected by default.
    pub fn dashboard_defaults() -> Self {
        Self::new(
            ["/dashboard/entreprise", "/dashboard/Gerants", "/dashboard/paiements"],
            Vec::<String>::new(),
        )
    }

    /// Register a dynamic submenu entry (matched literally, not by prefix).
    pub fn add_submenu(&mut self, path: impl Into<String>) {
        self.literals.push(path.into());
    }

    pub fn is_protected(&self, path: &str) -> bool {
        if self.exclusions.iter().any(|e| path.starts_with(e.as_str())) {
            return false;
        }
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
            || self.literals.iter().any(|l| l == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn prefix_entries_match_by_starts_with() {
        let paths = ProtectedPaths::dashboard_defaults();
        assert!(paths.is_protected("/dashboard/entreprise"));
        assert!(paths.is_protected("/dashboard/entreprise/details"));
        assert!(!paths.is_protected("/dashboard/Agents"));
        assert!(!paths.is_protected("/login"));
    }

    #[test]
    fn submenu_entries_match_literally() {
        let mut paths = ProtectedPaths::dashboard_defaults();
        paths.add_submenu("/dashboard/services/svc-1");

        assert!(paths.is_protected("/dashboard/services/svc-1"));
        assert!(!paths.is_protected("/dashboard/services/svc-1/members"));
        assert!(!paths.is_protected("/dashboard/services"));
    }

    #[test]
    fn exclusions_take_precedence() {
        let paths = ProtectedPaths::new(
            ["/dashboard/entreprise"],
            ["/dashboard/entreprise/public"],
        );
        assert!(paths.is_protected("/dashboard/entreprise"));
        assert!(!paths.is_protected("/dashboard/entreprise/public"));
        assert!(!paths.is_protected("/dashboard/entreprise/public/logo"));
    }

    proptest! {
        #[test]
        fn any_extension_of_a_protected_prefix_stays_protected(suffix in "[a-zA-Z0-9/_-]{0,32}") {
            let paths = ProtectedPaths::new(["/dashboard/entreprise"], Vec::<String>::new());
            let path = format!("/dashboard/entreprise{suffix}");
            prop_assert!(paths.is_protected(&path));
        }
    }
}
