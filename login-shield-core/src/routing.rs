//! Route resolution seam used to build the recovery redirect target.

use std::collections::{HashMap, HashSet};

/// Resolves a named route plus a parameter map to a concrete URL.
///
/// The gate only needs this for the recovery redirect; keeping it behind a
/// trait keeps the core independent of any particular router.
pub trait RouteResolver: Send + Sync + 'static {
    /// Returns `None` when the route name is unknown or a required
    /// parameter is missing.
    fn resolve(&self, route: &str, params: &HashMap<String, String>) -> Option<String>;
}

/// Table-driven resolver mapping route names to path templates.
///
/// Template segments of the form `:name` are substituted from the parameter
/// map. Parameters without a matching segment are appended as a query
/// string in sorted order.
#[derive(Debug, Clone, Default)]
pub struct StaticRouteResolver {
    routes: HashMap<String, String>,
}

impl StaticRouteResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.routes.insert(name.into(), template.into());
        self
    }
}

impl RouteResolver for StaticRouteResolver {
    fn resolve(&self, route: &str, params: &HashMap<String, String>) -> Option<String> {
        let template = self.routes.get(route)?;

        let mut used: HashSet<&str> = HashSet::new();
        let mut path = String::new();
        for segment in template.split('/') {
            if segment.is_empty() {
                continue;
            }
            path.push('/');
            if let Some(name) = segment.strip_prefix(':') {
                let value = params.get(name)?;
                used.insert(name);
                path.push_str(value);
            } else {
                path.push_str(segment);
            }
        }
        if path.is_empty() {
            path.push('/');
        }

        let mut extra: Vec<(&String, &String)> = params
            .iter()
            .filter(|(key, _)| !used.contains(key.as_str()))
            .collect();
        extra.sort();
        for (i, (key, value)) in extra.iter().enumerate() {
            path.push(if i == 0 { '?' } else { '&' });
            path.push_str(key);
            path.push('=');
            path.push_str(value);
        }

        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_plain_route() {
        let resolver = StaticRouteResolver::new().with_route("account_recover", "/recover");
        assert_eq!(
            resolver.resolve("account_recover", &HashMap::new()),
            Some("/recover".to_string())
        );
    }

    #[test]
    fn test_resolve_substitutes_params() {
        let resolver = StaticRouteResolver::new().with_route("user_show", "/users/:name/profile");
        assert_eq!(
            resolver.resolve("user_show", &params(&[("name", "alice")])),
            Some("/users/alice/profile".to_string())
        );
    }

    #[test]
    fn test_extra_params_become_query_string() {
        let resolver = StaticRouteResolver::new().with_route("account_recover", "/recover");
        assert_eq!(
            resolver.resolve("account_recover", &params(&[("b", "2"), ("a", "1")])),
            Some("/recover?a=1&b=2".to_string())
        );
    }

    #[test]
    fn test_unknown_route_and_missing_param() {
        let resolver = StaticRouteResolver::new().with_route("user_show", "/users/:name");
        assert_eq!(resolver.resolve("missing", &HashMap::new()), None);
        assert_eq!(resolver.resolve("user_show", &HashMap::new()), None);
    }
}
