//! Identifier case conversion between storage columns (snake_case) and API properties (camelCase).

/// "cms_page_version_id" -> "cmsPageVersionId"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        match c {
            '_' => upper_next = !out.is_empty(),
            _ if upper_next => {
                out.extend(c.to_uppercase());
                upper_next = false;
            }
            _ => out.push(c),
        }
    }
    out
}

/// "detailTeaserImage" -> "detail_teaser_image"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c.is_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_both_ways() {
        assert_eq!(to_camel_case("werkl_blog_entries_id"), "werklBlogEntriesId");
        assert_eq!(to_camel_case("id"), "id");
        assert_eq!(to_snake_case("seoPathInfo"), "seo_path_info");
        assert_eq!(to_snake_case(&to_camel_case("meta_title")), "meta_title");
    }

    #[test]
    fn leading_underscore_is_dropped_not_capitalized() {
        assert_eq!(to_camel_case("_total"), "total");
    }
}
