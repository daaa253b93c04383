//! Response envelopes: paginated pages with prev/next links, and
//! action results carrying a human-readable confirmation message.

use serde::Serialize;
use serde_json::Value;

/// List envelope: `{ "data": [...], "links": { "prev", "next" } }`.
#[derive(Serialize)]
pub struct Page {
    pub data: Vec<Value>,
    pub links: PageLinks,
}

#[derive(Serialize)]
pub struct PageLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Create/update/delete result: the affected row plus a confirmation message.
#[derive(Serialize)]
pub struct ActionBody {
    pub data: Value,
    pub message: String,
}

#[derive(Serialize)]
struct LinkQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    per_page: Option<u32>,
}

fn page_url(path: &str, search: Option<&str>, page: u32, per_page: Option<u32>) -> String {
    let query = LinkQuery { search, page, per_page };
    // Serializing a flat struct of scalars cannot fail.
    let qs = serde_urlencoded::to_string(&query).unwrap_or_default();
    format!("/{}?{}", path, qs)
}

impl Page {
    /// Build the envelope for one page of rows. `page` is 1-based; `total` is
    /// the size of the filtered set. Links carry the active filter forward and
    /// are null at the edges.
    pub fn new(
        path: &str,
        data: Vec<Value>,
        search: Option<&str>,
        page: u32,
        per_page: u32,
        per_page_explicit: bool,
        total: u64,
    ) -> Self {
        let carried = per_page_explicit.then_some(per_page);
        let prev = (page > 1).then(|| page_url(path, search, page - 1, carried));
        let has_next = u64::from(page) * u64::from(per_page) < total;
        let next = has_next.then(|| page_url(path, search, page + 1, carried));
        Page {
            data,
            links: PageLinks { prev, next },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_page_has_no_prev() {
        let page = Page::new("autors", vec![], None, 1, 10, false, 25);
        assert!(page.links.prev.is_none());
        assert_eq!(page.links.next.as_deref(), Some("/autors?page=2"));
    }

    #[test]
    fn last_page_has_no_next() {
        let page = Page::new("autors", vec![], None, 3, 10, false, 25);
        assert_eq!(page.links.prev.as_deref(), Some("/autors?page=2"));
        assert!(page.links.next.is_none());
    }

    #[test]
    fn links_carry_the_active_filter() {
        let page = Page::new("libros", vec![], Some("don quijote"), 2, 10, false, 40);
        assert_eq!(
            page.links.prev.as_deref(),
            Some("/libros?search=don+quijote&page=1")
        );
        assert_eq!(
            page.links.next.as_deref(),
            Some("/libros?search=don+quijote&page=3")
        );
    }

    #[test]
    fn explicit_per_page_is_carried() {
        let page = Page::new("personas", vec![], None, 1, 5, true, 12);
        assert_eq!(page.links.next.as_deref(), Some("/personas?page=2&per_page=5"));
    }

    #[test]
    fn envelope_shape_matches_contract() {
        let page = Page::new("autors", vec![json!({"id": 1})], None, 1, 10, false, 1);
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v["data"][0]["id"], 1);
        assert!(v["links"]["prev"].is_null());
        assert!(v["links"]["next"].is_null());
    }
}
