//! Builders for the nested component descriptors a front-end renders.
//!
//! A descriptor is `{component, props?, content?, text?}`; these helpers only
//! assemble JSON, they carry no behaviour.

use serde_json::{json, Value};

pub fn form(rows: Vec<Value>) -> Value {
    json!({ "component": "VForm", "content": rows })
}

pub fn row(cols: Vec<Value>) -> Value {
    json!({ "component": "VRow", "content": cols })
}

/// Column spanning the full width on small screens and `md` units otherwise.
pub fn col(md: u8, content: Value) -> Value {
    json!({
        "component": "VCol",
        "props": { "cols": 12, "md": md },
        "content": [content]
    })
}

pub fn switch(model: &str, label: &str) -> Value {
    json!({
        "component": "VSwitch",
        "props": { "model": model, "label": label }
    })
}

pub fn text_field(model: &str, label: &str, placeholder: &str) -> Value {
    json!({
        "component": "VTextField",
        "props": { "model": model, "label": label, "placeholder": placeholder }
    })
}

pub fn select(model: &str, label: &str, items: &[&str], multiple: bool) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|name| json!({ "title": name, "value": name }))
        .collect();
    json!({
        "component": "VSelect",
        "props": {
            "model": model,
            "label": label,
            "items": items,
            "multiple": multiple,
            "chips": multiple
        }
    })
}

pub fn alert(text: &str) -> Value {
    json!({
        "component": "VAlert",
        "props": { "type": "info", "variant": "tonal", "text": text }
    })
}

/// Plain table: a header row followed by one `tr` per row.
pub fn table(headers: &[&str], rows: Vec<Vec<String>>) -> Value {
    let head: Vec<Value> = headers
        .iter()
        .map(|h| json!({ "component": "th", "text": h }))
        .collect();
    let body: Vec<Value> = rows
        .into_iter()
        .map(|cells| {
            let cells: Vec<Value> = cells
                .into_iter()
                .map(|c| json!({ "component": "td", "text": c }))
                .collect();
            json!({ "component": "tr", "content": cells })
        })
        .collect();

    json!({
        "component": "VTable",
        "props": { "hover": true },
        "content": [
            { "component": "thead", "content": [{ "component": "tr", "content": head }] },
            { "component": "tbody", "content": body }
        ]
    })
}

pub fn text(content: &str) -> Value {
    json!({ "component": "div", "props": { "class": "text-center" }, "text": content })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting() {
        let descriptor = form(vec![row(vec![col(6, switch("enabled", "Enable plugin"))])]);
        assert_eq!(descriptor["component"], "VForm");
        let column = &descriptor["content"][0]["content"][0];
        assert_eq!(column["props"]["md"], 6);
        assert_eq!(column["content"][0]["props"]["model"], "enabled");
    }

    #[test]
    fn test_table_rows() {
        let t = table(&["a", "b"], vec![vec!["1".into(), "2".into()]]);
        assert_eq!(t["content"][0]["content"][0]["content"][1]["text"], "b");
        assert_eq!(t["content"][1]["content"][0]["content"][0]["text"], "1");
    }
}
