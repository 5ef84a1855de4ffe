/// Redis key construction for Webify collections.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    /// `prefix:collection:id`
    pub fn document(&self, collection: &str, id: &str) -> String {
        format!("{}:{}:{}", self.prefix, collection, id)
    }

    /// Glob matching every document of a collection.
    pub fn collection_pattern(&self, collection: &str) -> String {
        format!("{}:{}:*", self.prefix, collection)
    }
}

/// Converts a dotted field path (`stats.posts_liked`) into a RedisJSON path.
pub fn json_path(field: &str) -> String {
    format!("$.{field}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_document_keys() {
        let ctx = KeyContext::new("webify");
        assert_eq!(ctx.document("users", "abc"), "webify:users:abc");
        assert_eq!(ctx.collection_pattern("posts"), "webify:posts:*");
    }

    #[test]
    fn builds_json_paths() {
        assert_eq!(json_path("stats.online"), "$.stats.online");
    }
}
