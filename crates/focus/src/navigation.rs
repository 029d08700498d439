use foundation::slug::Slug;

/// Receives navigation requests; the host's router owns the location.
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

impl<F: FnMut(&str)> Navigator for F {
    fn navigate(&mut self, path: &str) {
        self(path)
    }
}

/// Maps field slugs to application paths and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRoute {
    prefix: String,
}

impl FieldRoute {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn path_for(&self, slug: &Slug) -> String {
        format!("{}/{}", self.prefix, slug)
    }

    /// Slug segment of a path under this route.
    ///
    /// Query and fragment are ignored. Paths outside the route, or with an
    /// empty segment, carry no slug.
    pub fn slug_from_path(&self, path: &str) -> Option<Slug> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let rest = path.strip_prefix(&self.prefix)?.strip_prefix('/')?;
        let segment = rest.split('/').next().unwrap_or_default();
        if segment.is_empty() {
            return None;
        }
        Some(Slug::from_segment(segment))
    }
}
