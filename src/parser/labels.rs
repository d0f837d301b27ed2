use std::collections::HashMap;
use std::sync::LazyLock;

/// Normalized key of the address column; the only column whose links are
/// resolved to their target.
pub const ADDRESS_KEY: &str = "地址";

/// Built-in synonyms: raw header label → normalized key.
const STANDARD_LABELS: &[(&str, &str)] = &[
    ("ID", "ID"),
    ("景點名稱", "景點名稱"),
    ("名稱", "景點名稱"),
    ("Google 導航連結", ADDRESS_KEY),
    ("地址", ADDRESS_KEY),
    ("地點", ADDRESS_KEY),
    ("交通與停車資訊", "交通停車"),
    ("交通", "交通停車"),
    ("建議停留", "建議停留"),
    ("費用 (當地/台幣)", "費用"),
    ("費用", "費用"),
    ("景點介紹與營業確認", "介紹"),
    ("介紹", "介紹"),
    ("照片", "照片"),
    ("圖片", "照片"),
    ("照片連結", "照片"),
];

static STANDARD: LazyLock<ColumnLabelMap> = LazyLock::new(|| ColumnLabelMap {
    labels: STANDARD_LABELS
        .iter()
        .map(|(raw, key)| (raw.to_string(), key.to_string()))
        .collect(),
});

/// Raw table header label → normalized field key. Lookups are exact after
/// trimming; unknown labels map to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabelMap {
    labels: HashMap<String, String>,
}

impl Default for ColumnLabelMap {
    fn default() -> Self {
        STANDARD.clone()
    }
}

impl ColumnLabelMap {
    /// A map with no synonyms at all; every label passes through.
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    /// Returns a copy of this map with one more synonym. An existing entry
    /// for `raw` is replaced.
    pub fn with(mut self, raw: impl Into<String>, key: impl Into<String>) -> Self {
        self.labels.insert(raw.into().trim().to_string(), key.into());
        self
    }

    pub fn extend<I, K, V>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        entries
            .into_iter()
            .fold(self, |map, (raw, key)| map.with(raw, key))
    }

    pub fn normalize<'a>(&'a self, raw: &'a str) -> &'a str {
        let raw = raw.trim();
        self.labels.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.labels.contains_key(raw.trim())
    }

    /// Entries sorted by normalized key, then raw label.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .labels
            .iter()
            .map(|(raw, key)| (raw.as_str(), key.as_str()))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)));
        entries
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_share_a_key() {
        let map = ColumnLabelMap::default();
        assert_eq!(map.normalize("名稱"), "景點名稱");
        assert_eq!(map.normalize("景點名稱"), "景點名稱");
        assert_eq!(map.normalize("Google 導航連結"), ADDRESS_KEY);
        assert_eq!(map.normalize("地點"), ADDRESS_KEY);
        assert_eq!(map.normalize("費用 (當地/台幣)"), "費用");
        assert_eq!(map.normalize("圖片"), "照片");
    }

    #[test]
    fn unknown_label_passes_through() {
        let map = ColumnLabelMap::default();
        assert_eq!(map.normalize("備註"), "備註");
        assert!(!map.contains("備註"));
    }

    #[test]
    fn lookup_trims() {
        let map = ColumnLabelMap::default();
        assert_eq!(map.normalize("  交通 "), "交通停車");
    }

    #[test]
    fn lookup_is_exact() {
        let map = ColumnLabelMap::default();
        assert_eq!(map.normalize("id"), "id");
        assert_eq!(map.normalize("費用(當地/台幣)"), "費用(當地/台幣)");
    }

    #[test]
    fn with_does_not_touch_default() {
        let custom = ColumnLabelMap::default().with("備註", "notes");
        assert_eq!(custom.normalize("備註"), "notes");
        assert_eq!(ColumnLabelMap::default().normalize("備註"), "備註");
        assert_eq!(custom.len(), ColumnLabelMap::default().len() + 1);
    }

    #[test]
    fn extend_overrides() {
        let map = ColumnLabelMap::default().extend([("地點", "區域")]);
        assert_eq!(map.normalize("地點"), "區域");
    }

    #[test]
    fn empty_map_passes_everything() {
        let map = ColumnLabelMap::empty();
        assert!(map.is_empty());
        assert_eq!(map.normalize("名稱"), "名稱");
    }

    #[test]
    fn entries_sorted() {
        let map = ColumnLabelMap::empty().with("b", "k2").with("a", "k2").with("z", "k1");
        assert_eq!(map.entries(), [("z", "k1"), ("a", "k2"), ("b", "k2")]);
    }
}
