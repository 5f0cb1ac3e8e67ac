/// Canonical category name and its slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryKey {
    pub name: String,
    pub slug: String,
}

impl CategoryKey {
    pub fn from_name(raw: &str) -> Self {
        let name = raw.trim().to_lowercase();
        let slug = name.replace(' ', "-");
        Self { name, slug }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        let key = CategoryKey::from_name("  Korean BBQ ");
        assert_eq!(key.name, "korean bbq");
        assert_eq!(key.slug, "korean-bbq");
    }

    #[test]
    fn every_inner_space_becomes_a_dash() {
        assert_eq!(CategoryKey::from_name("Fast  Food").slug, "fast--food");
    }
}
