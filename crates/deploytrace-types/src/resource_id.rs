/// Borrowed view over an ARM resource path such as
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId<'a> {
    raw: &'a str,
}

/// Index of the resource-group name once the id is split on `/`
/// (the leading empty segment included).
const RESOURCE_GROUP_SEGMENT: usize = 4;

impl<'a> ResourceId<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    pub fn is_resource_group_scoped(&self) -> bool {
        self.raw.to_ascii_lowercase().contains("resourcegroups")
    }

    pub fn resource_group(&self) -> Option<&'a str> {
        if !self.is_resource_group_scoped() {
            return None;
        }
        self.raw
            .split('/')
            .nth(RESOURCE_GROUP_SEGMENT)
            .filter(|s| !s.is_empty())
    }

    pub fn last_segment(&self) -> Option<&'a str> {
        self.raw.trim_end_matches('/').rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Resource path with the subscription, resource-group and `providers`
    /// prefix removed, e.g. `Microsoft.Storage/storageAccounts/logs`.
    ///
    /// Ids that do not start with that prefix are returned unchanged.
    pub fn operation_name(&self) -> String {
        let mut segments = self.raw.trim_start_matches('/').split('/');
        let mut rest = Vec::new();
        let mut in_prefix = true;

        while let Some(segment) = segments.next() {
            if in_prefix {
                if segment.eq_ignore_ascii_case("subscriptions")
                    || segment.eq_ignore_ascii_case("resourceGroups")
                {
                    segments.next();
                    continue;
                }
                in_prefix = false;
                if segment.eq_ignore_ascii_case("providers") {
                    continue;
                }
            }
            rest.push(segment);
        }

        if rest.is_empty() {
            self.raw.to_string()
        } else {
            rest.join("/")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE: &str =
        "/subscriptions/0000/resourceGroups/rg-data/providers/Microsoft.Storage/storageAccounts/logs";

    #[test]
    fn test_resource_group_from_fixed_segment() {
        assert_eq!(ResourceId::new(STORAGE).resource_group(), Some("rg-data"));
    }

    #[test]
    fn test_resource_group_detection_is_case_insensitive() {
        let id = ResourceId::new("/subscriptions/0000/resourcegroups/rg-x/providers/A/b/c");
        assert!(id.is_resource_group_scoped());
        assert_eq!(id.resource_group(), Some("rg-x"));
    }

    #[test]
    fn test_subscription_scoped_has_no_resource_group() {
        let id = ResourceId::new("/subscriptions/0000/providers/Microsoft.Resources/deployments/d");
        assert!(!id.is_resource_group_scoped());
        assert_eq!(id.resource_group(), None);
    }

    #[test]
    fn test_operation_name_strips_prefix() {
        assert_eq!(
            ResourceId::new(STORAGE).operation_name(),
            "Microsoft.Storage/storageAccounts/logs"
        );
    }

    #[test]
    fn test_operation_name_keeps_child_resource_path() {
        let id = ResourceId::new(
            "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Sql/servers/db1/databases/main",
        );
        assert_eq!(id.operation_name(), "Microsoft.Sql/servers/db1/databases/main");
    }

    #[test]
    fn test_operation_name_of_subscription_scoped_resource() {
        let id = ResourceId::new("/subscriptions/0000/providers/Microsoft.Authorization/roleAssignments/ra");
        assert_eq!(id.operation_name(), "Microsoft.Authorization/roleAssignments/ra");
    }

    #[test]
    fn test_operation_name_of_bare_resource_group() {
        let id = ResourceId::new("/subscriptions/0000/resourceGroups/rg-new");
        assert_eq!(id.operation_name(), "/subscriptions/0000/resourceGroups/rg-new");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(ResourceId::new(STORAGE).last_segment(), Some("logs"));
        assert_eq!(ResourceId::new("").last_segment(), None);
    }
}
