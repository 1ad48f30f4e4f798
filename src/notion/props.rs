//! Best-effort scalar extraction from a decoded property map.
//!
//! Every extractor is total: a missing key, a differently typed value, or an
//! unrecognized tag yields the zero value of the target type. Callers never
//! see an error from this layer.
use super::model::{FileRef, Page, PropertyMap, PropertyValue, RichText};

/// Concatenated plain text of a title or rich-text property. Url and number
/// properties also render as text so text-like columns can be read uniformly.
pub fn plain_text(props: &PropertyMap, key: &str) -> String {
    match props.get(key) {
        Some(PropertyValue::Title { title }) => join_runs(title),
        Some(PropertyValue::RichText { rich_text }) => join_runs(rich_text),
        Some(PropertyValue::Url { url }) => url.clone().unwrap_or_default(),
        Some(PropertyValue::Number { number }) => number.map(format_number).unwrap_or_default(),
        _ => String::new(),
    }
}

pub fn number(props: &PropertyMap, key: &str) -> f64 {
    match props.get(key) {
        Some(PropertyValue::Number { number }) => number.unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn checkbox(props: &PropertyMap, key: &str) -> bool {
    match props.get(key) {
        Some(PropertyValue::Checkbox { checkbox }) => *checkbox,
        _ => false,
    }
}

pub fn select(props: &PropertyMap, key: &str) -> Option<String> {
    match props.get(key) {
        Some(PropertyValue::Select { select }) => select.as_ref().map(|o| o.name.clone()),
        _ => None,
    }
}

pub fn multi_select(props: &PropertyMap, key: &str) -> Vec<String> {
    match props.get(key) {
        Some(PropertyValue::MultiSelect { multi_select }) => {
            multi_select.iter().map(|o| o.name.clone()).collect()
        }
        _ => Vec::new(),
    }
}

/// ISO start string of a date property.
pub fn date_start(props: &PropertyMap, key: &str) -> Option<String> {
    match props.get(key) {
        Some(PropertyValue::Date { date }) => date.as_ref().and_then(|d| d.start.clone()),
        _ => None,
    }
}

pub fn url(props: &PropertyMap, key: &str) -> Option<String> {
    match props.get(key) {
        Some(PropertyValue::Url { url }) => url.clone().filter(|u| !u.is_empty()),
        _ => None,
    }
}

/// Id of the first related page of a relation property.
pub fn relation_first(props: &PropertyMap, key: &str) -> Option<String> {
    match props.get(key) {
        Some(PropertyValue::Relation { relation }) => relation.first().map(|r| r.id.clone()),
        _ => None,
    }
}

/// Cover image URL for a page. The page-level cover wins; otherwise fall back
/// to the named property, which may be a url or a files column (first file,
/// hosted or external).
pub fn cover(page: &Page, key: &str) -> String {
    if let Some(url) = page.cover.as_ref().and_then(FileRef::url) {
        return url.to_string();
    }
    match page.properties.get(key) {
        Some(PropertyValue::Url { url }) => url.clone().unwrap_or_default(),
        Some(PropertyValue::Files { files }) => files
            .first()
            .and_then(FileRef::url)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

fn join_runs(runs: &[RichText]) -> String {
    runs.iter().map(|r| r.plain_text.as_str()).collect()
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(v: serde_json::Value) -> PropertyMap {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn missing_key_yields_zero_values() {
        let empty = PropertyMap::new();
        assert_eq!(plain_text(&empty, "Name"), "");
        assert_eq!(number(&empty, "Pages"), 0.0);
        assert!(!checkbox(&empty, "Done"));
        assert_eq!(select(&empty, "Status"), None);
        assert!(multi_select(&empty, "Tags").is_empty());
        assert_eq!(date_start(&empty, "Due"), None);
        assert_eq!(url(&empty, "PDF"), None);
        assert_eq!(relation_first(&empty, "Book"), None);
    }

    #[test]
    fn mismatched_type_yields_zero_values() {
        let p = props(json!({
            "Name": { "id": "a", "type": "checkbox", "checkbox": true },
        }));
        assert_eq!(plain_text(&p, "Name"), "");
        assert_eq!(number(&p, "Name"), 0.0);
        assert_eq!(select(&p, "Name"), None);
    }

    #[test]
    fn plain_text_concatenates_runs() {
        let p = props(json!({
            "Summary": { "id": "s", "type": "rich_text", "rich_text": [
                { "plain_text": "two " }, { "plain_text": "parts" }
            ]},
        }));
        assert_eq!(plain_text(&p, "Summary"), "two parts");
    }

    #[test]
    fn plain_text_renders_url_and_number_properties() {
        let p = props(json!({
            "PDF": { "id": "u", "type": "url", "url": "https://x/y.pdf" },
            "Year": { "id": "n", "type": "number", "number": 1999 },
            "Price": { "id": "n2", "type": "number", "number": 12.5 },
            "Empty": { "id": "n3", "type": "number", "number": null },
        }));
        assert_eq!(plain_text(&p, "PDF"), "https://x/y.pdf");
        assert_eq!(plain_text(&p, "Year"), "1999");
        assert_eq!(plain_text(&p, "Price"), "12.5");
        assert_eq!(plain_text(&p, "Empty"), "");
    }

    #[test]
    fn date_start_reads_iso_string() {
        let p = props(json!({
            "Due": { "id": "d", "type": "date", "date": { "start": "2024-03-09" } },
            "Blank": { "id": "d2", "type": "date", "date": null },
        }));
        assert_eq!(date_start(&p, "Due"), Some("2024-03-09".to_string()));
        assert_eq!(date_start(&p, "Blank"), None);
    }

    #[test]
    fn cover_prefers_page_level_image() {
        let page: Page = serde_json::from_value(json!({
            "id": "p1",
            "cover": { "type": "external", "external": { "url": "https://cdn/cover.png" } },
            "properties": {
                "Cover": { "id": "c", "type": "url", "url": "https://prop/cover.png" },
            }
        }))
        .unwrap();
        assert_eq!(cover(&page, "Cover"), "https://cdn/cover.png");
    }

    #[test]
    fn cover_falls_back_to_url_then_files_property() {
        let page: Page = serde_json::from_value(json!({
            "id": "p1",
            "properties": {
                "Cover": { "id": "c", "type": "url", "url": "https://prop/cover.png" },
            }
        }))
        .unwrap();
        assert_eq!(cover(&page, "Cover"), "https://prop/cover.png");

        let page: Page = serde_json::from_value(json!({
            "id": "p2",
            "cover": null,
            "properties": {
                "Cover": { "id": "c", "type": "files", "files": [
                    { "name": "a", "type": "file", "file": { "url": "https://files/a.png" } }
                ]},
            }
        }))
        .unwrap();
        assert_eq!(cover(&page, "Cover"), "https://files/a.png");

        let bare: Page = serde_json::from_value(json!({ "id": "p3", "properties": {} })).unwrap();
        assert_eq!(cover(&bare, "Cover"), "");
    }

    #[test]
    fn relation_first_takes_leading_entry() {
        let p = props(json!({
            "Book": { "id": "r", "type": "relation", "relation": [
                { "id": "book-1" }, { "id": "book-2" }
            ]},
        }));
        assert_eq!(relation_first(&p, "Book"), Some("book-1".to_string()));
    }
}
