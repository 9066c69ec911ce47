// Top-N aggregates over the stats `top_*` lists.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEntry {
    pub name: String,
    pub count: u64,
}

/// Flatten `[{key: count}, ...]`, sort by count descending then key
/// ascending, keep the first `n`.
pub fn top_n(list: &[BTreeMap<String, u64>], n: usize) -> Vec<TopEntry> {
    let mut entries: Vec<TopEntry> = list
        .iter()
        .flat_map(|item| {
            item.iter().map(|(name, count)| TopEntry {
                name: name.clone(),
                count: *count,
            })
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(name: &str, count: u64) -> BTreeMap<String, u64> {
        BTreeMap::from([(name.to_owned(), count)])
    }

    #[test]
    fn ties_break_on_name() {
        let list = vec![
            item("zeta.example", 5),
            item("alpha.example", 5),
            item("big.example", 9),
            item("small.example", 1),
        ];
        let top = top_n(&list, 3);
        let names: Vec<&str> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["big.example", "alpha.example", "zeta.example"]);
    }

    #[test]
    fn short_list_and_zero_n() {
        let list = vec![item("a", 1)];
        assert_eq!(top_n(&list, 10).len(), 1);
        assert!(top_n(&list, 0).is_empty());
        assert!(top_n(&[], 5).is_empty());
    }
}
