use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, trace};

use super::links::resolve_cell;
use crate::parser::blocks::Block;
use crate::parser::labels::{ColumnLabelMap, ADDRESS_KEY};

/// Keyword that identifies the itinerary table's header row.
pub const HEADER_KEYWORD: &str = "景點名稱";

/// Header, separator, and at least one data row.
const MIN_TABLE_LINES: usize = 3;

/// One table row keyed by normalized column label, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItineraryItem {
    fields: Vec<(String, String)>,
}

impl ItineraryItem {
    /// Set `key`. A repeated key keeps its first position and takes the
    /// latest value.
    pub fn insert(&mut self, key: &str, value: String) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ItineraryItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Extract the itinerary table. `None` when there is no header row or the
/// table block is too short to hold a data row.
pub fn extract(blocks: &[Block], labels: &ColumnLabelMap) -> Option<Vec<ItineraryItem>> {
    let Some(header_idx) = blocks
        .iter()
        .position(|b| b.raw().contains('|') && b.raw().contains(HEADER_KEYWORD))
    else {
        debug!("no table header containing {HEADER_KEYWORD}");
        return None;
    };

    let table: Vec<&str> = blocks[header_idx..]
        .iter()
        .map(|b| b.raw())
        .filter(|line| line.contains('|'))
        .collect();
    if table.len() < MIN_TABLE_LINES {
        debug!(lines = table.len(), "table block too short");
        return None;
    }

    let keys: Vec<&str> = non_empty_cells(table[0])
        .map(|raw| labels.normalize(raw))
        .collect();

    let items: Vec<ItineraryItem> = table[2..]
        .iter()
        .filter(|line| {
            let keep = has_numeric_id(line);
            if !keep {
                trace!(line = %line, "discarding row without numeric id");
            }
            keep
        })
        .map(|line| build_item(&keys, &positional_cells(line)))
        .collect();

    debug!(columns = keys.len(), rows = items.len(), "parsed itinerary table");
    Some(items)
}

fn build_item(keys: &[&str], cells: &[&str]) -> ItineraryItem {
    let mut item = ItineraryItem::default();
    for (i, key) in keys.iter().enumerate() {
        let cell = cells.get(i).copied().unwrap_or("");
        item.insert(key, resolve_cell(cell, *key == ADDRESS_KEY));
    }
    item
}

/// Trimmed cells with empty pieces dropped (absorbs edge pipes).
fn non_empty_cells(line: &str) -> impl Iterator<Item = &str> {
    line.split('|').map(str::trim).filter(|c| !c.is_empty())
}

fn has_numeric_id(line: &str) -> bool {
    non_empty_cells(line)
        .next()
        .is_some_and(|id| id.bytes().all(|b| b.is_ascii_digit()))
}

/// Cells by position. A row written with a leading pipe loses its first and
/// last split segments; other rows are split as-is.
fn positional_cells(line: &str) -> Vec<&str> {
    let line = line.trim();
    let segments: Vec<&str> = line.split('|').collect();
    let segments = if line.starts_with('|') {
        &segments[1..segments.len() - 1]
    } else {
        &segments[..]
    };
    segments.iter().map(|c| c.trim()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::classify_lines;

    fn items(md: &str) -> Option<Vec<ItineraryItem>> {
        extract(&classify_lines(md), &ColumnLabelMap::default())
    }

    const TABLE: &str = "\
| ID | 景點名稱 | Google 導航連結 | 介紹 |
|---|---|---|---|
| 1 | 清水寺 | [Open in Maps](https://maps.example/x) | 見 [官網](https://kiyomizu) |
| 2 | 金閣寺 | 京都市北區 | 世界遺產 |
";

    #[test]
    fn header_normalized() {
        let rows = items(TABLE).unwrap();
        let keys: Vec<&str> = rows[0].keys().collect();
        assert_eq!(keys, ["ID", "景點名稱", "地址", "介紹"]);
        assert!(!rows[0].contains_key("Google 導航連結"));
    }

    #[test]
    fn address_link_resolved_elsewhere_untouched() {
        let rows = items(TABLE).unwrap();
        assert_eq!(rows[0].get("地址"), Some("https://maps.example/x"));
        assert_eq!(rows[0].get("介紹"), Some("見 [官網](https://kiyomizu)"));
        assert_eq!(rows[1].get("地址"), Some("京都市北區"));
    }

    #[test]
    fn rows_in_order() {
        let rows = items(TABLE).unwrap();
        let names: Vec<&str> = rows.iter().filter_map(|r| r.get("景點名稱")).collect();
        assert_eq!(names, ["清水寺", "金閣寺"]);
    }

    #[test]
    fn non_numeric_rows_dropped() {
        let md = "\
| ID | 景點名稱 |
|---|---|
| abc | nope |
|  | empty id |
| 12 | kept |
| 3a | nope |
stray prose | with a pipe
";
        let rows = items(md).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("ID"), Some("12"));
        assert_eq!(rows[0].get("景點名稱"), Some("kept"));
    }

    #[test]
    fn empty_leading_cell_skips_to_next_for_id() {
        // The first non-empty cell decides; the empty ID column shifts it.
        let md = "| ID | 景點名稱 |\n|---|---|\n| | 7 |";
        let rows = items(md).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("ID"), Some(""));
        assert_eq!(rows[0].get("景點名稱"), Some("7"));
    }

    #[test]
    fn blank_rows_dropped() {
        let md = "| ID | 景點名稱 |\n|---|---|\n|  |  |\n| 5 | x |";
        let rows = items(md).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("ID"), Some("5"));
    }

    #[test]
    fn missing_cells_default_empty() {
        let md = "| ID | 景點名稱 | 建議停留 |\n|---|---|---|\n| 1 | 嵐山 |";
        let rows = items(md).unwrap();
        assert_eq!(rows[0].get("建議停留"), Some(""));
    }

    #[test]
    fn rows_without_edge_pipes() {
        let md = "ID | 景點名稱 | 費用\n---|---|---\n4 | 伏見稻荷 | 免費";
        let rows = items(md).unwrap();
        assert_eq!(rows[0].get("ID"), Some("4"));
        assert_eq!(rows[0].get("費用"), Some("免費"));
    }

    #[test]
    fn unmapped_label_kept() {
        let md = "| ID | 景點名稱 | 備註 |\n|---|---|---|\n| 1 | 嵐山 | 早去 |";
        let rows = items(md).unwrap();
        assert_eq!(rows[0].get("備註"), Some("早去"));
    }

    #[test]
    fn synonym_columns_collapse() {
        let md = "| ID | 景點名稱 | 地址 | 地點 |\n|---|---|---|---|\n| 1 | 嵐山 | A | B |";
        let rows = items(md).unwrap();
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0].get("地址"), Some("B"));
        let keys: Vec<&str> = rows[0].keys().collect();
        assert_eq!(keys, ["ID", "景點名稱", "地址"]);
    }

    #[test]
    fn custom_label_map() {
        let labels = ColumnLabelMap::default().with("備註", "notes");
        let md = "| ID | 景點名稱 | 備註 |\n|---|---|---|\n| 1 | 嵐山 | 早去 |";
        let rows = extract(&classify_lines(md), &labels).unwrap();
        assert_eq!(rows[0].get("notes"), Some("早去"));
        assert!(!rows[0].contains_key("備註"));
    }

    #[test]
    fn no_header_keyword() {
        assert!(items("| ID | Name |\n|---|---|\n| 1 | x |").is_none());
        assert!(items("景點名稱 without pipes").is_none());
    }

    #[test]
    fn too_short() {
        assert!(items("| ID | 景點名稱 |\n|---|---|").is_none());
    }

    #[test]
    fn header_only_with_separator_and_prose_rows() {
        let rows = items("| ID | 景點名稱 |\n|---|---|\nnote | here").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn later_pipe_lines_join_the_block() {
        let md = "| ID | 景點名稱 |\n|---|---|\n| 1 | a |\n\nprose\n\n| 2 | b |";
        let rows = items(md).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn serializes_in_column_order() {
        let rows = items(TABLE).unwrap();
        let json = serde_json::to_string(&rows[1]).unwrap();
        assert_eq!(
            json,
            r#"{"ID":"2","景點名稱":"金閣寺","地址":"京都市北區","介紹":"世界遺產"}"#
        );
    }
}
